//! Human-readable configuration summary with secrets masked.

use std::fmt;

use super::Config;

/// Displays a configuration section by section, masking every secret.
pub struct ConfigSummary<'a>(pub &'a Config);

impl fmt::Display for ConfigSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;

        writeln!(f, "=== MovieInfo Configuration ===")?;
        writeln!(f, "App Name: {}", c.app.name)?;
        writeln!(f, "Version: {}", c.app.version)?;
        writeln!(f, "Environment: {}", c.app.environment)?;
        writeln!(f, "Debug Mode: {}", c.app.debug)?;
        writeln!(f, "Port: {}", c.app.port)?;
        writeln!(f)?;

        writeln!(f, "=== Database ===")?;
        writeln!(f, "Driver: {}", c.database.driver)?;
        writeln!(f, "Host: {}:{}", c.database.host, c.database.port)?;
        writeln!(f, "Database: {}", c.database.database)?;
        writeln!(f, "Username: {}", c.database.username)?;
        writeln!(f, "Password: {}", mask_secret(&c.database.password))?;
        writeln!(
            f,
            "Pool: max_open={} max_idle={}",
            c.database.max_open_conns, c.database.max_idle_conns
        )?;
        writeln!(f)?;

        writeln!(f, "=== Redis ===")?;
        writeln!(f, "Host: {}", c.redis.address())?;
        writeln!(f, "Database: {}", c.redis.database)?;
        writeln!(f, "Password: {}", mask_secret(&c.redis.password))?;
        writeln!(f)?;

        writeln!(f, "=== Log ===")?;
        writeln!(f, "Level: {}", c.log.level)?;
        writeln!(f, "Format: {}", c.log.format)?;
        writeln!(f, "Output: {}", c.log.output)?;
        if c.log.output == "file" {
            writeln!(f, "File Path: {}", c.log.file.path)?;
        }
        writeln!(f)?;

        writeln!(f, "=== JWT ===")?;
        writeln!(f, "Secret: {}", mask_secret(&c.jwt.secret))?;
        writeln!(
            f,
            "Expire Time: {}",
            humantime::format_duration(c.jwt.expire_time)
        )?;
        writeln!(f, "Issuer: {}", c.jwt.issuer)
    }
}

/// Mask a secret, keeping at most the first and last two characters.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    match chars.len() {
        0 => "<empty>".to_string(),
        1..=4 => "****".to_string(),
        n => {
            let head: String = chars[..2].iter().collect();
            let tail: String = chars[n - 2..].iter().collect();
            format!("{head}****{tail}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "<empty>");
        assert_eq!(mask_secret("abcd"), "****");
        assert_eq!(mask_secret("supersecret"), "su****et");
        assert_eq!(mask_secret("пароль123"), "па****23");
    }

    #[test]
    fn test_summary_never_prints_secrets() {
        let mut config = Config::default();
        config.database.password = "database-password".to_string();
        config.redis.password = "redis-password".to_string();
        config.jwt.secret = "jwt-signing-secret".to_string();
        config.log.output = "file".to_string();
        config.log.file.path = "logs/app.log".to_string();

        let rendered = ConfigSummary(&config).to_string();
        assert!(!rendered.contains("database-password"));
        assert!(!rendered.contains("redis-password"));
        assert!(!rendered.contains("jwt-signing-secret"));
        assert!(rendered.contains("Password: da****rd"));
        assert!(rendered.contains("File Path: logs/app.log"));
    }
}
