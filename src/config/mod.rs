//! Configuration module

mod site;

pub use site::CmsConfig;
pub use site::RevalidateConfig;
pub use site::SiteConfig;
pub use site::StringsConfig;
pub use site::{ENV_ACCESS_TOKEN, ENV_API_ENDPOINT};
