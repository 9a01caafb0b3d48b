//! Extraction of a handler's request type.

use camino::Utf8Path;
use storm_reflection::{ReflectedType, TypeKind};

use crate::error::CommandError;

/// Property a request wrapper carries its payload in.
pub const WRAPPER_DATA_PROPERTY: &str = "data";

/// The object type a command's flags are derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRequest {
    /// Object-literal or class request type.
    pub ty: ReflectedType,
    /// Type name of the wrapper the payload was unwrapped from, if any.
    pub wrapper: Option<String>,
}

/// Derives the request type of a reflected handler or request shape.
///
/// Functions contribute their first parameter. A request wrapper (an object
/// with a `data` property) is unwrapped to the payload type, the generic
/// `object` type becomes an empty object literal, and object literals and
/// classes are used as they are.
///
/// # Errors
///
/// Returns [`CommandError::InvalidShape`] naming `source` for functions
/// without parameters and for any other kind of type.
pub fn extract_request(
    reflected: &ReflectedType,
    source: &Utf8Path,
) -> Result<ExtractedRequest, CommandError> {
    let candidate = match reflected.as_function() {
        Some(signature) => {
            &signature
                .parameters
                .first()
                .ok_or_else(|| {
                    CommandError::invalid_shape(source, "a function without parameters")
                })?
                .ty
        }
        None => reflected,
    };

    if let Some(data) = candidate
        .is_object_like()
        .then(|| candidate.property(WRAPPER_DATA_PROPERTY))
        .flatten()
    {
        let wrapper = candidate
            .type_name
            .clone()
            .unwrap_or_else(|| "StormRequest".to_owned());
        return Ok(ExtractedRequest {
            ty: object_shape(&data.ty, source)?,
            wrapper: Some(wrapper),
        });
    }

    Ok(ExtractedRequest {
        ty: object_shape(candidate, source)?,
        wrapper: None,
    })
}

fn object_shape(ty: &ReflectedType, source: &Utf8Path) -> Result<ReflectedType, CommandError> {
    match &ty.kind {
        TypeKind::ObjectLiteral(_) | TypeKind::Class { .. } => Ok(ty.clone()),
        TypeKind::Object => {
            let mut empty = ReflectedType::object_literal(Vec::new());
            empty.description.clone_from(&ty.description);
            Ok(empty)
        }
        _ => Err(CommandError::invalid_shape(source, ty.kind_name())),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use storm_reflection::{FunctionSignature, ReflectedParameter, ReflectedProperty};

    use super::*;

    fn handler(parameter: Option<ReflectedType>) -> ReflectedType {
        ReflectedType::function(FunctionSignature {
            name: Some("handler".into()),
            parameters: parameter
                .into_iter()
                .map(|ty| ReflectedParameter {
                    name: "request".into(),
                    ty,
                    optional: false,
                    default: None,
                })
                .collect(),
            returns: Box::new(ReflectedType::void()),
        })
    }

    fn deploy_input() -> ReflectedType {
        ReflectedType::object_literal(vec![ReflectedProperty::new(
            "target",
            ReflectedType::string(),
        )])
    }

    #[test]
    fn unwraps_wrapper_data() {
        let wrapped = ReflectedType::object_literal(vec![ReflectedProperty::new(
            "data",
            deploy_input(),
        )])
        .with_type_name("StormRequest");

        let extracted =
            extract_request(&handler(Some(wrapped)), Utf8Path::new("deploy.ts")).expect("extract");

        assert!(extracted.ty.has_property("target"));
        assert_eq!(extracted.wrapper.as_deref(), Some("StormRequest"));
    }

    #[test]
    fn object_literals_are_used_verbatim() {
        let extracted = extract_request(&handler(Some(deploy_input())), Utf8Path::new("a.ts"))
            .expect("extract");

        assert_eq!(extracted.ty, deploy_input());
        assert!(extracted.wrapper.is_none());
    }

    #[test]
    fn generic_object_becomes_empty_literal() {
        let extracted = extract_request(&ReflectedType::object(), Utf8Path::new("a.ts"))
            .expect("extract");

        assert_eq!(extracted.ty.kind_name(), "objectLiteral");
        assert!(extracted.ty.properties().is_empty());
    }

    #[rstest]
    #[case::bare_string(handler(Some(ReflectedType::string())), "string")]
    #[case::array(handler(Some(ReflectedType::array(ReflectedType::string()))), "array")]
    #[case::no_parameters(handler(None), "without parameters")]
    #[case::wrapped_number(
        ReflectedType::object_literal(vec![ReflectedProperty::new(
            "data",
            ReflectedType::number()
        )]),
        "number"
    )]
    fn rejects_other_shapes(#[case] reflected: ReflectedType, #[case] found: &str) {
        let error = extract_request(&reflected, Utf8Path::new("src/commands/echo.ts"))
            .expect_err("shape is invalid");
        let message = error.to_string();

        assert!(message.contains("src/commands/echo.ts"), "{message}");
        assert!(message.contains("must be of type objectLiteral or class"), "{message}");
        assert!(message.contains(found), "{message}");
    }
}
