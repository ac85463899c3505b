//! Order-sensitive content hash over annotation arguments

use crate::features::node::AnnotationValue;
use crate::shared::utils::StreamingHash64;

// value tags, folded before every value
const TAG_BOOL: u8 = 1;
const TAG_BYTE: u8 = 2;
const TAG_CHAR: u8 = 3;
const TAG_SHORT: u8 = 4;
const TAG_INT: u8 = 5;
const TAG_LONG: u8 = 6;
const TAG_FLOAT: u8 = 7;
const TAG_DOUBLE: u8 = 8;
const TAG_STRING: u8 = 9;
const TAG_CLASS: u8 = 10;
const TAG_ENUM: u8 = 11;
const TAG_ANNOTATION: u8 = 12;
const TAG_ARRAY: u8 = 13;

/// Hash of one annotation's arguments, in visitation order.
///
/// Reordering arguments changes the hash; no canonicalization is applied.
pub fn content_hash(args: &[(String, AnnotationValue)]) -> u64 {
    let mut hasher = StreamingHash64::new();
    for (name, value) in args {
        hasher.update_str(name);
        fold_value(&mut hasher, value);
    }
    hasher.finish()
}

fn fold_value(hasher: &mut StreamingHash64, value: &AnnotationValue) {
    match value {
        AnnotationValue::Bool(v) => {
            hasher.update_tag(TAG_BOOL).update_bytes(&[u8::from(*v)]);
        }
        AnnotationValue::Byte(v) => {
            hasher.update_tag(TAG_BYTE).update_bytes(&v.to_be_bytes());
        }
        AnnotationValue::Char(v) => {
            hasher.update_tag(TAG_CHAR).update_bytes(&v.to_be_bytes());
        }
        AnnotationValue::Short(v) => {
            hasher.update_tag(TAG_SHORT).update_bytes(&v.to_be_bytes());
        }
        AnnotationValue::Int(v) => {
            hasher.update_tag(TAG_INT).update_bytes(&v.to_be_bytes());
        }
        AnnotationValue::Long(v) => {
            hasher.update_tag(TAG_LONG).update_bytes(&v.to_be_bytes());
        }
        AnnotationValue::Float(bits) => {
            hasher.update_tag(TAG_FLOAT).update_bytes(&bits.to_be_bytes());
        }
        AnnotationValue::Double(bits) => {
            hasher.update_tag(TAG_DOUBLE).update_bytes(&bits.to_be_bytes());
        }
        AnnotationValue::String(s) => {
            hasher.update_tag(TAG_STRING).update_str(s);
        }
        AnnotationValue::Class(ty) => {
            // binary name of the referenced class; primitives and arrays use
            // their descriptor
            let name = match ty.class_name() {
                Some(name) if !ty.is_array() => name.to_string(),
                _ => ty.descriptor(),
            };
            hasher.update_tag(TAG_CLASS).update_str(&name);
        }
        AnnotationValue::Enum { descriptor, value } => {
            hasher
                .update_tag(TAG_ENUM)
                .update_str(descriptor)
                .update_str(value);
        }
        AnnotationValue::Annotation { descriptor, args } => {
            let nested = content_hash(args);
            hasher
                .update_tag(TAG_ANNOTATION)
                .update_str(descriptor)
                .update_u64(nested);
        }
        AnnotationValue::Array(items) => {
            hasher.update_tag(TAG_ARRAY);
            for item in items {
                fold_value(hasher, item);
            }
            hasher.update_u64(items.len() as u64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::TypeRepr;

    fn args(pairs: &[(&str, AnnotationValue)]) -> Vec<(String, AnnotationValue)> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_same_arguments_same_hash() {
        let a = args(&[("value", AnnotationValue::string("x")), ("n", AnnotationValue::Int(1))]);
        let b = args(&[("value", AnnotationValue::string("x")), ("n", AnnotationValue::Int(1))]);
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_value_change_changes_hash() {
        let a = args(&[("n", AnnotationValue::Int(1))]);
        let b = args(&[("n", AnnotationValue::Int(2))]);
        let c = args(&[("n", AnnotationValue::Long(1))]);
        assert_ne!(content_hash(&a), content_hash(&b));
        assert_ne!(content_hash(&a), content_hash(&c));
    }

    #[test]
    fn test_order_sensitive() {
        let a = args(&[("a", AnnotationValue::Int(1)), ("b", AnnotationValue::Int(2))]);
        let b = args(&[("b", AnnotationValue::Int(2)), ("a", AnnotationValue::Int(1))]);
        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_arrays_fold_length() {
        let nested = args(&[(
            "v",
            AnnotationValue::Array(vec![
                AnnotationValue::Array(vec![AnnotationValue::Int(1)]),
                AnnotationValue::Array(vec![]),
            ]),
        )]);
        let shifted = args(&[(
            "v",
            AnnotationValue::Array(vec![
                AnnotationValue::Array(vec![]),
                AnnotationValue::Array(vec![AnnotationValue::Int(1)]),
            ]),
        )]);
        assert_ne!(content_hash(&nested), content_hash(&shifted));
    }

    #[test]
    fn test_class_literal_and_nested_annotation() {
        let a = args(&[("type", AnnotationValue::Class(TypeRepr::class("a/Foo")))]);
        let b = args(&[("type", AnnotationValue::Class(TypeRepr::class("a/Bar")))]);
        assert_ne!(content_hash(&a), content_hash(&b));

        let inner = |v: i32| AnnotationValue::Annotation {
            descriptor: "La/Inner;".to_string(),
            args: args(&[("x", AnnotationValue::Int(v))]),
        };
        assert_eq!(
            content_hash(&args(&[("i", inner(1))])),
            content_hash(&args(&[("i", inner(1))]))
        );
        assert_ne!(
            content_hash(&args(&[("i", inner(1))])),
            content_hash(&args(&[("i", inner(2))]))
        );
    }
}
