use std::fmt;
use std::sync::Arc;

/// Element type of a metadata signature, reduced to what translation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Void,
    Boolean,
    Char,
    I1,
    U1,
    I2,
    U2,
    I4,
    U4,
    I8,
    U8,
    R4,
    R8,
    I,
    U,
    String,
    Object,
    Class,
    ValueType,
}

impl ElementType {
    /// Whether values of this type live inline rather than behind a reference.
    pub fn is_value_type(&self) -> bool {
        !matches!(
            self,
            ElementType::Void | ElementType::String | ElementType::Object | ElementType::Class
        )
    }
}

/// Reference to a type, by full name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: Arc<str>,
    pub element: ElementType,
}

impl TypeRef {
    pub fn new(name: &str, element: ElementType) -> Self {
        Self {
            name: Arc::from(name),
            element,
        }
    }

    pub fn is_value_type(&self) -> bool {
        self.element.is_value_type()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub declaring_type: TypeRef,
    pub name: Arc<str>,
    pub field_type: TypeRef,
    pub is_static: bool,
}

impl FieldRef {
    pub fn instance(declaring_type: TypeRef, name: &str, field_type: TypeRef) -> Self {
        Self {
            declaring_type,
            name: Arc::from(name),
            field_type,
            is_static: false,
        }
    }

    pub fn static_field(declaring_type: TypeRef, name: &str, field_type: TypeRef) -> Self {
        Self {
            is_static: true,
            ..Self::instance(declaring_type, name, field_type)
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}::{}", self.field_type, self.declaring_type, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub declaring_type: TypeRef,
    pub name: Arc<str>,
    pub parameters: Vec<TypeRef>,
    /// `None` for `void` methods.
    pub return_type: Option<TypeRef>,
    pub has_this: bool,
}

impl MethodRef {
    pub fn new(
        declaring_type: TypeRef,
        name: &str,
        parameters: Vec<TypeRef>,
        return_type: Option<TypeRef>,
        has_this: bool,
    ) -> Self {
        Self {
            declaring_type,
            name: Arc::from(name),
            parameters,
            return_type,
            has_this,
        }
    }

    /// Number of values a call consumes, including the instance reference.
    pub fn stack_arguments(&self) -> usize {
        self.parameters.len() + usize::from(self.has_this)
    }

    pub fn is_void(&self) -> bool {
        self.return_type
            .as_ref()
            .is_none_or(|ty| ty.element == ElementType::Void)
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.return_type {
            Some(ret) => write!(f, "{} ", ret)?,
            None => f.write_str("void ")?,
        }
        write!(f, "{}::{}(", self.declaring_type, self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")
    }
}
