/// Implement [`Entity`](crate::Entity) for a type from its schema declaration.
///
/// The declaration is evaluated and validated on first use and cached for the
/// process lifetime; later calls return the same schema (or the same error).
///
/// ```rust
/// use repomap::{entity, Entity, Schema, ValidationError};
///
/// #[derive(Debug, Default)]
/// struct Note { text: String }
///
/// entity!(Note, Schema::<Note>::builder("note", "n")
///     .field("text", |n| n.text.clone(), |n, v| n.text = v)
///     .build());
///
/// assert!(matches!(Note::schema(), Err(ValidationError::MissingPrimaryKey { .. })));
/// ```
#[macro_export]
macro_rules! entity {
    ($ty:ty, $schema:expr $(,)?) => {
        impl $crate::Entity for $ty {
            fn schema() -> ::core::result::Result<&'static $crate::Schema<Self>, $crate::ValidationError> {
                static SCHEMA: $crate::__private::Lazy<
                    ::core::result::Result<$crate::Schema<$ty>, $crate::ValidationError>,
                > = $crate::__private::Lazy::new(|| $schema);
                SCHEMA.as_ref().map_err(::core::clone::Clone::clone)
            }
        }
    };
}
