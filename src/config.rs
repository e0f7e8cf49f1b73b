/// 配置管理模組
///
/// 負責加載、驗證和管理系統配置，支持開發與生產環境的分離配置。
// 宣告子模組
pub mod loader;
pub mod types;
pub mod validation;

// 重新導出常用組件
pub use loader::{ConfigLoader, Environment};
pub use types::*;
pub use validation::{ValidationError, ValidationUtils, Validator};

use config::ConfigError;
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

// 全局配置實例
static CONFIG: OnceCell<CoreConfig> = OnceCell::new();

/// 獲取應用程序配置實例
pub fn get_config() -> &'static CoreConfig {
    CONFIG.get_or_init(|| CoreConfig::load_from_env().expect("無法加載應用程序配置"))
}

/// 初始化配置（在應用程序啟動時調用）
pub fn init_config() -> Result<(), ConfigError> {
    let core_config = CoreConfig::load_from_env()?;

    if CONFIG.set(core_config).is_err() {
        warn!("配置已經被初始化，跳過重複初始化");
    } else {
        debug!("配置初始化成功，環境：{:?}", Environment::from_env());
    }

    Ok(())
}

impl CoreConfig {
    /// 從環境變數指定的環境加載配置
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let env = Environment::from_env();
        debug!("從環境加載配置: {:?}", env);
        Self::load(env)
    }

    /// 從指定環境加載配置
    pub fn load(env: Environment) -> Result<Self, ConfigError> {
        let config_source = ConfigLoader::load(env)?;
        let core_config: CoreConfig = config_source.try_deserialize()?;

        if let Err(err) = core_config.validate() {
            warn!("配置驗證失敗: {}", err);
        } else {
            debug!("配置驗證通過");
        }

        Ok(core_config)
    }
}
