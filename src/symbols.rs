//! Function outlines for `cicode symbols`.

use std::fmt;

use cicode_ast::{CicodeType, Literal, Parameter, Program, ReturnType, Scope};
use cicode_core::LineIndex;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FunctionSymbol {
    pub name: String,
    pub scope: Scope,
    pub return_type: ReturnType,
    pub parameters: Vec<ParameterSymbol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// 1-based line of the function name.
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParameterSymbol {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: CicodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl fmt::Display for FunctionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope == Scope::Private {
            write!(f, "PRIVATE ")?;
        }
        write!(f, "{} FUNCTION {}(", self.return_type, self.name)?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", parameter.ty, parameter.name)?;
            if let Some(default) = &parameter.default {
                write!(f, " = {default}")?;
            }
        }
        write!(f, ")")
    }
}

impl ParameterSymbol {
    fn new(parameter: &Parameter, description: Option<&str>) -> Self {
        ParameterSymbol {
            name: parameter.name.clone(),
            ty: parameter.ty,
            default: parameter.default.clone(),
            description: description.map(str::to_string),
        }
    }
}

/// Collect the functions of `program` in source order.
pub fn function_symbols(
    db: &dyn salsa::Database,
    program: Program<'_>,
    text: &str,
) -> Vec<FunctionSymbol> {
    let index = LineIndex::new(text);
    program
        .functions(db)
        .map(|function| {
            let doc = function.doc(db).as_ref();
            FunctionSymbol {
                name: function.name(db).clone(),
                scope: function.scope(db),
                return_type: function.return_type(db),
                parameters: function
                    .parameters(db)
                    .iter()
                    .map(|parameter| {
                        ParameterSymbol::new(parameter, doc.and_then(|doc| doc.param(&parameter.name)))
                    })
                    .collect(),
                summary: doc.and_then(|doc| doc.summary.clone()),
                line: index.line_col(function.name_span(db).start).0 + 1,
            }
        })
        .collect()
}
