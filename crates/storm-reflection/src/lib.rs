//! Structural reflection of TypeScript command modules for Storm Stack.
//!
//! This crate describes what a TypeScript export looks like without running
//! it:
//!
//! - **Type model** via [`ReflectedType`] and [`ReflectedProperty`], covering
//!   primitives, literals, enums, arrays, unions, object literals, classes,
//!   and function signatures
//! - **Oracle seam** via [`ReflectionOracle`], the interface the command
//!   engine reflects modules through
//! - **Static oracle** via [`StaticReflectionOracle`], a Tree-sitter reader of
//!   `.ts` and `.tsx` sources
//! - **Binary codec** via [`encode_type`] and [`decode_type`], the envelope
//!   format reflections are persisted in
//!
//! # Example
//!
//! ```ignore
//! use storm_reflection::{ReflectionOracle, StaticReflectionOracle};
//!
//! let oracle = StaticReflectionOracle::new();
//! let handler = oracle.reflect("src/commands/deploy.ts".into(), None)?;
//! println!("{}", handler.signature());
//! ```

mod builder;
mod codec;
mod dialect;
mod error;
mod oracle;
mod static_oracle;
mod types;

pub use builder::ReflectionBuilder;
pub use codec::{
    ENVELOPE_MAGIC, TYPE_GRAPH_INTERFACE_ID, decode_message, decode_type, encode_message,
    encode_type,
};
pub use dialect::SourceDialect;
pub use error::ReflectionError;
pub use oracle::ReflectionOracle;
pub use static_oracle::{DEFAULT_REQUEST_WRAPPERS, StaticReflectionOracle};
pub use types::{
    DefaultValue, EnumMember, FunctionSignature, LiteralValue, ReflectedParameter,
    ReflectedProperty, ReflectedType, TagBag, TypeKind, property_key, quote,
};
