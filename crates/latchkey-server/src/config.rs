//! Command line and environment configuration.
//!
//! Every flag can also be supplied through a `LATCHKEY_*` environment
//! variable so secrets stay out of the process list.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use latchkey_core::{ConfigError, ControllerConfig, CredentialSet};

/// GPIO backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GpioBackend {
    /// In-memory lines that only log transitions
    Sim,
    /// Linux sysfs GPIO (`/sys/class/gpio`)
    Sysfs,
}

/// Latchkey server arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "latchkey-server", version, about = "Network-controlled door lock")]
pub struct Args {
    /// Address to serve HTTP on
    #[arg(long, env = "LATCHKEY_LISTEN", default_value = "0.0.0.0:80")]
    pub listen: SocketAddr,

    /// Accepted request credential (repeatable or comma separated)
    #[arg(
        long = "credential",
        env = "LATCHKEY_CREDENTIALS",
        value_delimiter = ',',
        required = true
    )]
    pub credentials: Vec<String>,

    /// Administrator user for the log page
    #[arg(long, env = "LATCHKEY_ADMIN_USER", default_value = "admin")]
    pub admin_user: String,

    /// Administrator password for the log page
    #[arg(long, env = "LATCHKEY_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,

    /// Audit log file
    #[arg(long, env = "LATCHKEY_AUDIT_FILE", default_value = "latchkey-audit.log")]
    pub audit_file: PathBuf,

    /// Button debounce delay in milliseconds
    #[arg(long, env = "LATCHKEY_DEBOUNCE_MS", default_value_t = 100)]
    pub debounce_ms: u64,

    /// Auto-lock delay in milliseconds
    #[arg(long, env = "LATCHKEY_AUTO_LOCK_MS", default_value_t = 5000)]
    pub auto_lock_ms: u64,

    /// Control loop interval in milliseconds
    #[arg(long, env = "LATCHKEY_POLL_MS", default_value_t = 10)]
    pub poll_ms: u64,

    /// Button unlocks stay unlocked instead of auto-locking
    #[arg(long, env = "LATCHKEY_NO_BUTTON_AUTO_LOCK")]
    pub no_button_auto_lock: bool,

    /// GPIO backend
    #[arg(long, env = "LATCHKEY_GPIO", value_enum, default_value_t = GpioBackend::Sim)]
    pub gpio: GpioBackend,

    /// sysfs GPIO root
    #[arg(long, env = "LATCHKEY_GPIO_ROOT", default_value = "/sys/class/gpio")]
    pub gpio_root: PathBuf,

    /// Lock actuator line
    #[arg(long, env = "LATCHKEY_LOCK_PIN", default_value_t = 0)]
    pub lock_pin: u32,

    /// Reverse (unlock) actuator line
    #[arg(long, env = "LATCHKEY_REVERSE_LOCK_PIN", default_value_t = 2)]
    pub reverse_lock_pin: u32,

    /// Local unlock button line (active low)
    #[arg(long, env = "LATCHKEY_BUTTON_PIN", default_value_t = 5)]
    pub button_pin: u32,

    /// Pending request capacity of the control loop
    #[arg(long, env = "LATCHKEY_INBOX_CAPACITY", default_value_t = 32)]
    pub inbox_capacity: usize,

    /// tracing filter directive
    #[arg(long, env = "LATCHKEY_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Args {
    /// Controller timing derived from the millisecond flags.
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            debounce_delay: Duration::from_millis(self.debounce_ms),
            auto_lock_delay: Duration::from_millis(self.auto_lock_ms),
            poll_interval: Duration::from_millis(self.poll_ms),
            button_auto_lock: !self.no_button_auto_lock,
        }
    }

    /// Accepted request credentials.
    pub fn credential_set(&self) -> Result<CredentialSet, ConfigError> {
        CredentialSet::new(self.credentials.iter().cloned())
    }

    /// Log page credentials.
    pub fn admin(&self) -> AdminCredentials {
        AdminCredentials { user: self.admin_user.clone(), password: self.admin_password.clone() }
    }
}

/// User and password guarding the log page.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    /// Expected user name
    pub user: String,
    /// Expected password
    pub password: String,
}

impl AdminCredentials {
    /// Whether `user`/`password` match exactly.
    pub fn matches(&self, user: &str, password: &str) -> bool {
        self.user == user && self.password == password
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["latchkey-server", "--admin-password", "secret"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_controller_defaults() {
        let args = parse(&["--credential", "password1"]);
        assert_eq!(args.controller_config(), ControllerConfig::default());
        assert_eq!(args.listen, "0.0.0.0:80".parse::<SocketAddr>().unwrap());
        assert_eq!(args.gpio, GpioBackend::Sim);
        assert_eq!(args.admin_user, "admin");
    }

    #[test]
    fn credentials_accept_commas_and_repeats() {
        let args = parse(&["--credential", "password1,password2", "--credential", "password3"]);
        let set = args.credential_set().unwrap();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn empty_credential_is_rejected() {
        let args = parse(&["--credential", "password1", "--credential", ""]);
        assert_eq!(args.credential_set().unwrap_err(), ConfigError::EmptyCredential);
    }

    #[test]
    fn admin_password_is_required() {
        let result = Args::try_parse_from(["latchkey-server", "--credential", "password1"]);
        assert!(result.is_err());
    }

    #[test]
    fn button_auto_lock_flag() {
        let args = parse(&["--credential", "p", "--no-button-auto-lock", "--gpio", "sysfs"]);
        assert!(!args.controller_config().button_auto_lock);
        assert_eq!(args.gpio, GpioBackend::Sysfs);
    }

    #[test]
    fn admin_debug_hides_password() {
        let admin = AdminCredentials { user: "admin".into(), password: "hunter2".into() };
        assert!(!format!("{admin:?}").contains("hunter2"));
        assert!(admin.matches("admin", "hunter2"));
        assert!(!admin.matches("admin", "hunter3"));
    }
}
