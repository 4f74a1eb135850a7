use serde::{Deserialize, Serialize};

/// Kind of a declaration or reference.
///
/// The index provider reports kinds as strings; the mapping here is the
/// closed set the analyzer understands. Declaration and reference
/// occurrences share the same kind strings, so one enum serves both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Kind {
    // Types
    Class,
    Struct,
    Enum,
    Protocol,
    Typealias,
    AssociatedType,
    EnumElement,
    GenericTypeParam,
    Module,
    PrecedenceGroup,

    // Extensions
    Extension,
    ExtensionClass,
    ExtensionStruct,
    ExtensionEnum,
    ExtensionProtocol,

    // Functions
    FunctionFree,
    FunctionMethodInstance,
    FunctionMethodClass,
    FunctionMethodStatic,
    FunctionConstructor,
    FunctionDestructor,
    FunctionSubscript,
    FunctionOperator,
    FunctionOperatorInfix,
    FunctionOperatorPrefix,
    FunctionOperatorPostfix,
    FunctionAccessorGetter,
    FunctionAccessorSetter,
    FunctionAccessorWillSet,
    FunctionAccessorDidSet,
    FunctionAccessorAddress,
    FunctionAccessorMutableAddress,

    // Variables
    VarInstance,
    VarClass,
    VarStatic,
    VarGlobal,
    VarLocal,
    VarParameter,
}

impl Kind {
    /// The provider-facing string form. Round-trips through [`Kind::parse`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Class => "class",
            Kind::Struct => "struct",
            Kind::Enum => "enum",
            Kind::Protocol => "protocol",
            Kind::Typealias => "typealias",
            Kind::AssociatedType => "associatedtype",
            Kind::EnumElement => "enumelement",
            Kind::GenericTypeParam => "genericTypeParam",
            Kind::Module => "module",
            Kind::PrecedenceGroup => "precedenceGroup",
            Kind::Extension => "extension",
            Kind::ExtensionClass => "extension.class",
            Kind::ExtensionStruct => "extension.struct",
            Kind::ExtensionEnum => "extension.enum",
            Kind::ExtensionProtocol => "extension.protocol",
            Kind::FunctionFree => "function.free",
            Kind::FunctionMethodInstance => "function.method.instance",
            Kind::FunctionMethodClass => "function.method.class",
            Kind::FunctionMethodStatic => "function.method.static",
            Kind::FunctionConstructor => "function.constructor",
            Kind::FunctionDestructor => "function.destructor",
            Kind::FunctionSubscript => "function.subscript",
            Kind::FunctionOperator => "function.operator",
            Kind::FunctionOperatorInfix => "function.operator.infix",
            Kind::FunctionOperatorPrefix => "function.operator.prefix",
            Kind::FunctionOperatorPostfix => "function.operator.postfix",
            Kind::FunctionAccessorGetter => "function.accessor.getter",
            Kind::FunctionAccessorSetter => "function.accessor.setter",
            Kind::FunctionAccessorWillSet => "function.accessor.willset",
            Kind::FunctionAccessorDidSet => "function.accessor.didset",
            Kind::FunctionAccessorAddress => "function.accessor.address",
            Kind::FunctionAccessorMutableAddress => "function.accessor.mutableaddress",
            Kind::VarInstance => "var.instance",
            Kind::VarClass => "var.class",
            Kind::VarStatic => "var.static",
            Kind::VarGlobal => "var.global",
            Kind::VarLocal => "var.local",
            Kind::VarParameter => "var.parameter",
        }
    }

    /// Parse the provider string form.
    pub fn parse(s: &str) -> Option<Kind> {
        let kind = match s {
            "class" => Kind::Class,
            "struct" => Kind::Struct,
            "enum" => Kind::Enum,
            "protocol" => Kind::Protocol,
            "typealias" => Kind::Typealias,
            "associatedtype" => Kind::AssociatedType,
            "enumelement" => Kind::EnumElement,
            "genericTypeParam" => Kind::GenericTypeParam,
            "module" => Kind::Module,
            "precedenceGroup" => Kind::PrecedenceGroup,
            "extension" => Kind::Extension,
            "extension.class" => Kind::ExtensionClass,
            "extension.struct" => Kind::ExtensionStruct,
            "extension.enum" => Kind::ExtensionEnum,
            "extension.protocol" => Kind::ExtensionProtocol,
            "function.free" => Kind::FunctionFree,
            "function.method.instance" => Kind::FunctionMethodInstance,
            "function.method.class" => Kind::FunctionMethodClass,
            "function.method.static" => Kind::FunctionMethodStatic,
            "function.constructor" => Kind::FunctionConstructor,
            "function.destructor" => Kind::FunctionDestructor,
            "function.subscript" => Kind::FunctionSubscript,
            "function.operator" => Kind::FunctionOperator,
            "function.operator.infix" => Kind::FunctionOperatorInfix,
            "function.operator.prefix" => Kind::FunctionOperatorPrefix,
            "function.operator.postfix" => Kind::FunctionOperatorPostfix,
            "function.accessor.getter" => Kind::FunctionAccessorGetter,
            "function.accessor.setter" => Kind::FunctionAccessorSetter,
            "function.accessor.willset" => Kind::FunctionAccessorWillSet,
            "function.accessor.didset" => Kind::FunctionAccessorDidSet,
            "function.accessor.address" => Kind::FunctionAccessorAddress,
            "function.accessor.mutableaddress" => Kind::FunctionAccessorMutableAddress,
            "var.instance" => Kind::VarInstance,
            "var.class" => Kind::VarClass,
            "var.static" => Kind::VarStatic,
            "var.global" => Kind::VarGlobal,
            "var.local" => Kind::VarLocal,
            "var.parameter" => Kind::VarParameter,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Kind::Class
                | Kind::Struct
                | Kind::Enum
                | Kind::Protocol
                | Kind::Typealias
                | Kind::AssociatedType
                | Kind::EnumElement
                | Kind::GenericTypeParam
                | Kind::Module
                | Kind::PrecedenceGroup
        )
    }

    pub fn is_extension(&self) -> bool {
        matches!(
            self,
            Kind::Extension
                | Kind::ExtensionClass
                | Kind::ExtensionStruct
                | Kind::ExtensionEnum
                | Kind::ExtensionProtocol
        )
    }

    pub fn is_function(&self) -> bool {
        matches!(
            self,
            Kind::FunctionFree
                | Kind::FunctionMethodInstance
                | Kind::FunctionMethodClass
                | Kind::FunctionMethodStatic
                | Kind::FunctionConstructor
                | Kind::FunctionDestructor
                | Kind::FunctionSubscript
                | Kind::FunctionOperator
                | Kind::FunctionOperatorInfix
                | Kind::FunctionOperatorPrefix
                | Kind::FunctionOperatorPostfix
                | Kind::FunctionAccessorGetter
                | Kind::FunctionAccessorSetter
                | Kind::FunctionAccessorWillSet
                | Kind::FunctionAccessorDidSet
                | Kind::FunctionAccessorAddress
                | Kind::FunctionAccessorMutableAddress
        )
    }

    pub fn is_accessor(&self) -> bool {
        matches!(
            self,
            Kind::FunctionAccessorGetter
                | Kind::FunctionAccessorSetter
                | Kind::FunctionAccessorWillSet
                | Kind::FunctionAccessorDidSet
                | Kind::FunctionAccessorAddress
                | Kind::FunctionAccessorMutableAddress
        )
    }

    pub fn is_variable(&self) -> bool {
        matches!(
            self,
            Kind::VarInstance
                | Kind::VarClass
                | Kind::VarStatic
                | Kind::VarGlobal
                | Kind::VarLocal
                | Kind::VarParameter
        )
    }

    /// Kinds that can own conformances and members.
    pub fn is_concrete_type(&self) -> bool {
        matches!(self, Kind::Class | Kind::Struct | Kind::Enum)
    }

    /// Human-readable name for reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Kind::Class => "class",
            Kind::Struct => "struct",
            Kind::Enum => "enum",
            Kind::Protocol => "protocol",
            Kind::Typealias => "typealias",
            Kind::AssociatedType => "associated type",
            Kind::EnumElement => "enum case",
            Kind::GenericTypeParam => "generic type parameter",
            Kind::Module => "module",
            Kind::PrecedenceGroup => "precedence group",
            Kind::Extension
            | Kind::ExtensionClass
            | Kind::ExtensionStruct
            | Kind::ExtensionEnum
            | Kind::ExtensionProtocol => "extension",
            Kind::FunctionConstructor => "initializer",
            Kind::FunctionDestructor => "deinitializer",
            Kind::FunctionSubscript => "subscript",
            Kind::FunctionOperator
            | Kind::FunctionOperatorInfix
            | Kind::FunctionOperatorPrefix
            | Kind::FunctionOperatorPostfix => "operator",
            Kind::FunctionFree => "function",
            Kind::FunctionMethodInstance
            | Kind::FunctionMethodClass
            | Kind::FunctionMethodStatic => "method",
            Kind::FunctionAccessorGetter
            | Kind::FunctionAccessorSetter
            | Kind::FunctionAccessorWillSet
            | Kind::FunctionAccessorDidSet
            | Kind::FunctionAccessorAddress
            | Kind::FunctionAccessorMutableAddress => "accessor",
            Kind::VarInstance | Kind::VarClass | Kind::VarStatic => "property",
            Kind::VarGlobal => "global variable",
            Kind::VarLocal => "variable",
            Kind::VarParameter => "parameter",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> String {
        kind.as_str().to_owned()
    }
}

impl TryFrom<String> for Kind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Kind::parse(&s).ok_or_else(|| format!("unknown kind '{}'", s))
    }
}
