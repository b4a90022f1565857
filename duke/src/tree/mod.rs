pub mod version;
pub mod descriptor;
pub mod annotation;
pub mod field;
pub mod method;
pub mod class;
pub mod module;
pub mod signature;

/// Defines a `String`-backed newtype with the usual conversions. Used for the various kinds of
/// JVM names (class/field/method/parameter names) and descriptors, so that a `ClassName` can't
/// accidentally be passed where a `FieldName` was expected.
macro_rules! make_name_like {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
		pub struct $name(pub String);

		impl $name {
			pub fn as_str(&self) -> &str {
				&self.0
			}

			pub fn into_inner(self) -> String {
				self.0
			}
		}

		impl From<String> for $name {
			fn from(value: String) -> Self {
				$name(value)
			}
		}

		impl From<&str> for $name {
			fn from(value: &str) -> Self {
				$name(value.to_owned())
			}
		}

		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}

		impl std::ops::Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				&self.0
			}
		}

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str(&self.0)
			}
		}
	};
}
pub(crate) use make_name_like;

/// Checks a class name (or array class "name", which is really a field descriptor) for validity
/// per JVMS 4.2.1.
pub(crate) fn is_valid_class_name(x: &str) -> bool {
	if x.starts_with('[') {
		true
	} else {
		!x.is_empty() && x.split('/').all(is_valid_unqualified_name)
	}
}

/// Checks a name (field, parameter, local variable) for validity per JVMS 4.2.2.
pub(crate) fn is_valid_unqualified_name(x: &str) -> bool {
	!x.is_empty() && x.chars().all(|c| !matches!(c, '.' | ';' | '[' | '/'))
}

/// Checks a method name for validity per JVMS 4.2.2, allowing the special `<init>`/`<clinit>`.
pub(crate) fn is_valid_method_name(x: &str) -> bool {
	x == "<init>" || x == "<clinit>" || (
		!x.is_empty() && x.chars().all(|c| !matches!(c, '.' | ';' | '[' | '/' | '<' | '>'))
	)
}

#[cfg(test)]
mod testing {
	use super::*;

	#[test]
	fn class_names() {
		assert!(is_valid_class_name("java/lang/Object"));
		assert!(is_valid_class_name("[[[D"));
		assert!(is_valid_class_name("An$Inner$Class"));
		assert!(!is_valid_class_name(""));
		assert!(!is_valid_class_name("a.b"));
		assert!(!is_valid_class_name("a;b"));
	}

	#[test]
	fn method_names() {
		assert!(is_valid_method_name("<init>"));
		assert!(is_valid_method_name("<clinit>"));
		assert!(is_valid_method_name("doStuff"));
		assert!(!is_valid_method_name("<other>"));
		assert!(!is_valid_method_name(""));
	}
}
