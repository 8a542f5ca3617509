// src/constants.rs

/// Logical name the browser uses to find and launch the native host
pub const HOST_NAME: &str = "activity_logger_bridge";

/// Extension id passed to the host as its second argument
pub const EXTENSION_ID: &str = "activity-logger@localhost";

/// URL prefixes that are never forwarded (internal, privileged and extension pages)
pub const EXCLUDED_URL_PREFIXES: [&str; 4] = ["about:", "chrome:", "moz-extension:", "resource:"];

/// Window id the browser reports when focus leaves every browser window
pub const WINDOW_ID_NONE: i64 = -1;

/// Native messaging frame cap (1 MiB, the browser's limit for host replies)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Application directory name under the platform data directory
pub const STATE_APP_DIR: &str = "activity_logger";

/// Subdirectory of the application directory owned by the bridge
pub const STATE_SUBDIR: &str = "bridge";

/// File holding the most recent activity record
pub const STATE_FILE_NAME: &str = "firefox_active_tab.json";

/// Environment variable overriding the host's state directory
pub const STATE_DIR_ENV: &str = "ACTIVITY_BRIDGE_STATE_DIR";
