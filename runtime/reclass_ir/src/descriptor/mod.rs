//! Canonical type and method descriptors.
//!
//! Member identity across redefinitions needs a signature encoding that two
//! independent observers produce identically. Types are encoded one
//! character per primitive, class references as `L<internal-name>;` and
//! arrays as `[<component>`. A method signature is `(<params>)<ret>`.
//!
//! ```text
//! int foo(String[] args, long n)   =>  ([Ljava/lang/String;J)I
//! void bar()                       =>  ()V
//! ```
//!
//! # Design
//!
//! - `TypeDesc` is the structured form; the canonical string is derived from it
//!   and is the only thing equality and hashing look at for signatures.
//! - Parsing is strict: every input either round-trips to the same string or
//!   is rejected with a `DescriptorError`.

use std::fmt;

use thiserror::Error;

/// Error produced when a descriptor or source-level type name cannot be encoded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The input was empty where a type was required.
    #[error("empty type descriptor")]
    Empty,

    /// A character that cannot start or continue a descriptor.
    #[error("unexpected character `{found}` at offset {offset} in `{input}`")]
    UnexpectedChar {
        input: String,
        offset: usize,
        found: char,
    },

    /// A class reference without the closing `;`, or with an empty name.
    #[error("unterminated class reference in `{input}`")]
    UnterminatedClass { input: String },

    /// `void` used as a parameter, field, or array component.
    #[error("`void` is only valid as a method return type (in `{input}`)")]
    MisplacedVoid { input: String },

    /// The input ended in the middle of a descriptor.
    #[error("unexpected end of descriptor `{input}`")]
    UnexpectedEnd { input: String },

    /// Input left over after a complete descriptor.
    #[error("trailing input after descriptor in `{input}`")]
    Trailing { input: String },

    /// A method descriptor that does not start with `(`.
    #[error("method descriptor must start with `(`: `{input}`")]
    MissingParameterList { input: String },

    /// A source-level type name that is not a valid identifier path.
    #[error("invalid type name `{name}`")]
    InvalidTypeName { name: String },
}

/// Primitive type kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Void,
}

impl Primitive {
    /// Single-character descriptor code.
    pub const fn code(self) -> char {
        match self {
            Primitive::Byte => 'B',
            Primitive::Char => 'C',
            Primitive::Double => 'D',
            Primitive::Float => 'F',
            Primitive::Int => 'I',
            Primitive::Long => 'J',
            Primitive::Short => 'S',
            Primitive::Boolean => 'Z',
            Primitive::Void => 'V',
        }
    }

    /// Decode a single-character descriptor code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            b'B' => Some(Primitive::Byte),
            b'C' => Some(Primitive::Char),
            b'D' => Some(Primitive::Double),
            b'F' => Some(Primitive::Float),
            b'I' => Some(Primitive::Int),
            b'J' => Some(Primitive::Long),
            b'S' => Some(Primitive::Short),
            b'Z' => Some(Primitive::Boolean),
            b'V' => Some(Primitive::Void),
            _ => None,
        }
    }

    /// Resolve a source-level keyword (`int`, `boolean`, ...).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "byte" => Primitive::Byte,
            "char" => Primitive::Char,
            "double" => Primitive::Double,
            "float" => Primitive::Float,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "short" => Primitive::Short,
            "boolean" => Primitive::Boolean,
            "void" => Primitive::Void,
            _ => return None,
        })
    }
}

/// A single type in descriptor form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    /// A primitive, including `void`.
    Primitive(Primitive),

    /// A class reference by internal (slash-delimited) name.
    Class(Box<str>),

    /// An array of a non-void component type.
    Array(Box<TypeDesc>),
}

impl TypeDesc {
    /// The `int` type.
    pub const INT: TypeDesc = TypeDesc::Primitive(Primitive::Int);

    /// The `void` return type.
    pub const VOID: TypeDesc = TypeDesc::Primitive(Primitive::Void);

    /// Create a class reference from a qualified or internal name.
    pub fn class(name: &str) -> Self {
        TypeDesc::Class(internal_name(name).into_boxed_str())
    }

    /// Create an array type.
    pub fn array(component: TypeDesc) -> Self {
        TypeDesc::Array(Box::new(component))
    }

    /// Check whether this is `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeDesc::Primitive(Primitive::Void))
    }

    /// Parse a complete single-type descriptor such as `[Ljava/lang/String;`.
    pub fn parse(input: &str) -> Result<Self, DescriptorError> {
        if input.is_empty() {
            return Err(DescriptorError::Empty);
        }
        let mut cursor = Cursor::new(input);
        let ty = cursor.type_desc()?;
        if ty.is_void() {
            return Err(DescriptorError::MisplacedVoid {
                input: input.to_owned(),
            });
        }
        cursor.finish()?;
        Ok(ty)
    }

    /// Encode a source-level type name such as `int`, `java.lang.String` or `long[][]`.
    pub fn from_source_name(name: &str) -> Result<Self, DescriptorError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DescriptorError::Empty);
        }

        let mut base = trimmed;
        let mut dims = 0usize;
        while let Some(rest) = base.strip_suffix("[]") {
            base = rest.trim_end();
            dims += 1;
        }

        let mut ty = match Primitive::from_keyword(base) {
            Some(Primitive::Void) if dims > 0 => {
                return Err(DescriptorError::MisplacedVoid {
                    input: name.to_owned(),
                });
            }
            Some(primitive) => TypeDesc::Primitive(primitive),
            None if is_qualified_identifier(base) => TypeDesc::class(base),
            None => {
                return Err(DescriptorError::InvalidTypeName {
                    name: name.to_owned(),
                });
            }
        };
        for _ in 0..dims {
            ty = TypeDesc::array(ty);
        }
        Ok(ty)
    }

    fn write_canonical(&self, out: &mut String) {
        match self {
            TypeDesc::Primitive(p) => out.push(p.code()),
            TypeDesc::Class(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
            TypeDesc::Array(component) => {
                out.push('[');
                component.write_canonical(out);
            }
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_canonical(&mut out);
        f.write_str(&out)
    }
}

/// Parameter list plus return type, with its canonical encoding precomputed.
///
/// Equality and hashing use the canonical string only, so two signatures
/// observed from independent parses compare equal when they encode the same.
#[derive(Clone, Debug)]
pub struct MethodSignature {
    params: Vec<TypeDesc>,
    ret: TypeDesc,
    canonical: Box<str>,
}

impl MethodSignature {
    /// Build a signature from already-encoded types.
    pub fn new(params: Vec<TypeDesc>, ret: TypeDesc) -> Self {
        let mut canonical = String::with_capacity(2 + params.len() * 2);
        canonical.push('(');
        for param in &params {
            param.write_canonical(&mut canonical);
        }
        canonical.push(')');
        ret.write_canonical(&mut canonical);
        MethodSignature {
            params,
            ret,
            canonical: canonical.into_boxed_str(),
        }
    }

    /// Parse a method descriptor such as `(I[J)V`.
    pub fn parse(input: &str) -> Result<Self, DescriptorError> {
        if input.is_empty() {
            return Err(DescriptorError::Empty);
        }
        let mut cursor = Cursor::new(input);
        if !cursor.eat(b'(') {
            return Err(DescriptorError::MissingParameterList {
                input: input.to_owned(),
            });
        }

        let mut params = Vec::new();
        while !cursor.eat(b')') {
            let param = cursor.type_desc()?;
            if param.is_void() {
                return Err(DescriptorError::MisplacedVoid {
                    input: input.to_owned(),
                });
            }
            params.push(param);
        }

        let ret = cursor.type_desc()?;
        cursor.finish()?;
        Ok(MethodSignature::new(params, ret))
    }

    /// Build a signature from source-level type names.
    pub fn from_source_names<S: AsRef<str>>(params: &[S], ret: &str) -> Result<Self, DescriptorError> {
        let params = params
            .iter()
            .map(|p| {
                let ty = TypeDesc::from_source_name(p.as_ref())?;
                if ty.is_void() {
                    return Err(DescriptorError::MisplacedVoid {
                        input: p.as_ref().to_owned(),
                    });
                }
                Ok(ty)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let ret = TypeDesc::from_source_name(ret)?;
        Ok(MethodSignature::new(params, ret))
    }

    /// Parameter types in declaration order.
    pub fn params(&self) -> &[TypeDesc] {
        &self.params
    }

    /// Return type.
    pub fn ret(&self) -> &TypeDesc {
        &self.ret
    }

    /// Canonical `(<params>)<ret>` encoding.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl PartialEq for MethodSignature {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for MethodSignature {}

impl std::hash::Hash for MethodSignature {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

/// Convert a dotted qualified name (`a.b.C`) to its internal form (`a/b/C`).
pub fn internal_name(qualified: &str) -> String {
    qualified.replace('.', "/")
}

fn is_qualified_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}

/// Byte cursor over a descriptor string.
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Cursor { input, pos: 0 }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> DescriptorError {
        match self.input[self.pos..].chars().next() {
            Some(found) => DescriptorError::UnexpectedChar {
                input: self.input.to_owned(),
                offset: self.pos,
                found,
            },
            None => DescriptorError::UnexpectedEnd {
                input: self.input.to_owned(),
            },
        }
    }

    fn type_desc(&mut self) -> Result<TypeDesc, DescriptorError> {
        let Some(byte) = self.peek() else {
            return Err(self.unexpected());
        };

        if let Some(primitive) = Primitive::from_code(byte) {
            self.pos += 1;
            return Ok(TypeDesc::Primitive(primitive));
        }

        match byte {
            b'[' => {
                self.pos += 1;
                let component = self.type_desc()?;
                if component.is_void() {
                    return Err(DescriptorError::MisplacedVoid {
                        input: self.input.to_owned(),
                    });
                }
                Ok(TypeDesc::array(component))
            }
            b'L' => {
                let start = self.pos + 1;
                let Some(len) = self.input[start..].find(';') else {
                    return Err(DescriptorError::UnterminatedClass {
                        input: self.input.to_owned(),
                    });
                };
                if len == 0 {
                    return Err(DescriptorError::UnterminatedClass {
                        input: self.input.to_owned(),
                    });
                }
                let name = &self.input[start..start + len];
                if let Some(bad) = name.find(['(', ')', '[', '.']) {
                    self.pos = start + bad;
                    return Err(self.unexpected());
                }
                self.pos = start + len + 1;
                Ok(TypeDesc::Class(name.into()))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn finish(&self) -> Result<(), DescriptorError> {
        if self.pos == self.input.len() {
            Ok(())
        } else {
            Err(DescriptorError::Trailing {
                input: self.input.to_owned(),
            })
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
