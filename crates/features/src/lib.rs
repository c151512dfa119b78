pub mod catalog;
pub mod codec;
pub mod feature;
pub mod registry;

pub use catalog::builtin_registry;
pub use codec::{ArgValue, CodecError, FeatureArgs};
pub use feature::{Feature, FeatureFactory, RuntimeContext};
pub use registry::{
    Category, FeatureRegistry, FeatureTypeDescriptor, LiteralParser, RegistryBuilder,
    SettingsFactory, SettingsParser,
};
