pub mod app_config;
pub mod config;
pub mod error;
pub mod install;
pub mod logging;
pub mod net;
pub mod paths;
pub mod process;
pub mod release;
pub mod scratch;
pub mod settings;
pub mod text_config;
pub mod update;

pub use app_config::{ApplicationConfig, ConfigStore, Mode};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use install::{InstallOutcome, Installer};
pub use paths::AppPaths;
pub use process::{ExitPayload, LaunchHandle, ProcessEvent, ProcessSupervisor, Tool};
pub use release::{ReleaseClient, ReleaseInfo};
pub use scratch::ScratchSpace;
pub use settings::{ServerSettings, SettingValue};
pub use update::{UpdateCheck, Updater};

/// Version of this build, as reported to the update check.
pub fn app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
