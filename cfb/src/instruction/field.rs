/// How a field is edited: a single-line input or a multi-line text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    Text,
    MultiLine,
}

/// Static description of one editable field of an instruction kind.
///
/// `name` is the key into a block's value mapping and never changes for
/// the lifetime of the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub shape: InputShape,
    pub placeholder: Option<&'static str>,
    pub required: bool,
    pub help: Option<&'static str>,
}

impl FieldSpec {
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        FieldSpec {
            name,
            label,
            shape: InputShape::Text,
            placeholder: None,
            required: false,
            help: None,
        }
    }

    pub const fn multi_line(name: &'static str, label: &'static str) -> Self {
        FieldSpec {
            shape: InputShape::MultiLine,
            ..FieldSpec::text(name, label)
        }
    }

    pub const fn placeholder(self, placeholder: &'static str) -> Self {
        FieldSpec {
            placeholder: Some(placeholder),
            ..self
        }
    }

    pub const fn required(self) -> Self {
        FieldSpec {
            required: true,
            ..self
        }
    }

    pub const fn help(self, help: &'static str) -> Self {
        FieldSpec {
            help: Some(help),
            ..self
        }
    }

    /// Value a freshly placed block starts with for this field.
    ///
    /// Required fields start at their placeholder so the preview shows a
    /// working example; optional fields start empty.
    pub fn initial_value(&self) -> &'static str {
        if self.required {
            self.placeholder.unwrap_or("")
        } else {
            ""
        }
    }
}
