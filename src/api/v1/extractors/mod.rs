mod forwarded;

pub use forwarded::{AuthenticatedConfigExtractor, ForwardedConfig, ForwardedConfigExtractor};
