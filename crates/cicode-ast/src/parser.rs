use std::cell::Cell;

use cicode_core::{CompilationPhase, Diagnostic, DiagnosticSeverity, SourceFile};
use cicode_grammar::GrammarLoadError;
use derive_more::{Display, Error, From};
use salsa::Accumulator;
use tree_sitter::{Node, Parser, Tree};

use crate::ast::*;
use crate::doc::FunctionDoc;

/// How deeply expressions, conditions and blocks may nest before lowering
/// gives up on a statement.
pub const MAX_NESTING: usize = 256;

/// A syntax-tree node that could not be turned into typed syntax.
#[derive(Debug, Display, Error, From)]
pub enum LowerError {
    #[display("missing {_0}")]
    Missing(#[error(not(source))] &'static str),
    #[display("unexpected `{_0}`")]
    Unexpected(#[error(not(source))] String),
    #[display("number `{_0}` does not fit in 64 bits")]
    NumberOutOfRange(#[error(not(source))] String),
    #[display("nested more than {} levels deep", MAX_NESTING)]
    TooDeep,
    #[from]
    #[display("invalid UTF-8 in source: {_0}")]
    Utf8(std::str::Utf8Error),
}

type LowerResult<T> = Result<T, LowerError>;

pub struct CicodeParser {
    parser: Parser,
}

impl CicodeParser {
    pub fn new() -> Result<Self, GrammarLoadError> {
        let mut parser = Parser::new();
        parser.set_language(&cicode_grammar::language())?;
        Ok(CicodeParser { parser })
    }

    pub fn parse(&mut self, source: &str) -> Option<Tree> {
        self.parser.parse(source, None)
    }

    /// Parse `source` and lower it into a [`Program`]. Syntax errors are
    /// accumulated as diagnostics; the parts that could be lowered are kept.
    pub fn parse_internal<'db>(
        &mut self,
        db: &'db dyn salsa::Database,
        source: &'db str,
    ) -> Program<'db> {
        let Some(tree) = self.parse(source) else {
            return Program::new(db, Vec::new());
        };

        for error in cicode_grammar::syntax_errors(tree.root_node(), source) {
            Diagnostic {
                message: error.message,
                span: error.range.into(),
                severity: DiagnosticSeverity::Error,
                phase: CompilationPhase::Parsing,
            }
            .accumulate(db);
        }

        Lowerer::new(db, source).program(&tree)
    }
}

#[salsa::tracked]
pub fn parse_source_file<'db>(db: &'db dyn salsa::Database, source: SourceFile) -> Program<'db> {
    let mut parser = match CicodeParser::new() {
        Ok(parser) => parser,
        Err(err) => {
            Diagnostic {
                message: err.to_string(),
                span: Span::new(0, 0),
                severity: DiagnosticSeverity::Error,
                phase: CompilationPhase::Parsing,
            }
            .accumulate(db);
            return Program::new(db, Vec::new());
        }
    };

    let program = parser.parse_internal(db, source.text(db));
    tracing::debug!(
        path = %source.path(db).display(),
        items = program.items(db).len(),
        "Lowered source file"
    );
    program
}

fn span(node: Node<'_>) -> Span {
    node.byte_range().into()
}

fn is_comment(node: &Node<'_>) -> bool {
    node.kind() == "comment"
}

fn children<'tree>(node: Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Named children, without comments.
fn significant<'tree>(node: Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !is_comment(child))
        .collect()
}

fn first_token<'tree>(node: Node<'tree>) -> Option<Node<'tree>> {
    children(node).into_iter().find(|child| !is_comment(child))
}

/// Decrements the lowering depth when dropped.
struct Nesting<'a>(&'a Cell<usize>);

impl Drop for Nesting<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

struct Lowerer<'db> {
    db: &'db dyn salsa::Database,
    source: &'db str,
    depth: Cell<usize>,
}

impl<'db> Lowerer<'db> {
    fn new(db: &'db dyn salsa::Database, source: &'db str) -> Self {
        Lowerer {
            db,
            source,
            depth: Cell::new(0),
        }
    }

    fn nested(&self) -> LowerResult<Nesting<'_>> {
        let depth = self.depth.get() + 1;
        if depth > MAX_NESTING {
            return Err(LowerError::TooDeep);
        }
        self.depth.set(depth);
        Ok(Nesting(&self.depth))
    }

    fn text(&self, node: Node<'_>) -> LowerResult<&'db str> {
        Ok(node.utf8_text(self.source.as_bytes())?)
    }

    fn identifier(
        &self,
        node: Option<Node<'_>>,
        what: &'static str,
    ) -> LowerResult<Spanned<Identifier>> {
        match node {
            Some(node) if !node.is_missing() => Ok((self.text(node)?.to_string(), span(node))),
            _ => Err(LowerError::Missing(what)),
        }
    }

    /// Report a node that could not be lowered. Nodes that already contain a
    /// syntax error were reported while parsing.
    fn report(&self, node: Node<'_>, err: LowerError) {
        if node.has_error() {
            tracing::trace!(kind = node.kind(), error = %err, "Skipping node with syntax errors");
            return;
        }
        Diagnostic {
            message: err.to_string(),
            span: span(node),
            severity: DiagnosticSeverity::Error,
            phase: CompilationPhase::AstGeneration,
        }
        .accumulate(self.db);
    }

    fn program(&self, tree: &Tree) -> Program<'db> {
        let mut items = Vec::new();
        let mut doc = FunctionDoc::default();

        for child in significant(tree.root_node()) {
            match child.kind() {
                "doc_summary" => doc.add_summary(self.doc_content(child)),
                "doc_returns" => doc.add_returns(self.doc_content(child)),
                "doc_param" => {
                    let tag = significant(child)
                        .into_iter()
                        .find(|node| node.kind() == "param_tag");
                    if let Some(tag) = tag {
                        let text = self.text(tag).unwrap_or_default();
                        doc.add_param(text, self.doc_content(child), span(tag));
                    }
                }
                "a_function" => {
                    let doc = std::mem::take(&mut doc);
                    match self.function(child, (!doc.is_empty()).then_some(doc)) {
                        Ok(item) => items.push(item),
                        Err(err) => self.report(child, err),
                    }
                }
                _ => doc = FunctionDoc::default(),
            }
        }

        Program::new(self.db, items)
    }

    /// The text between a doc tag and its closing tag.
    fn doc_content(&self, node: Node<'_>) -> &'db str {
        significant(node)
            .into_iter()
            .find(|child| child.kind().ends_with("_content"))
            .and_then(|content| self.text(content).ok())
            .unwrap_or_default()
    }

    fn function(&self, node: Node<'_>, doc: Option<FunctionDoc>) -> LowerResult<Item<'db>> {
        let parts = significant(node);
        let definition = parts
            .iter()
            .copied()
            .find(|child| child.kind() == "function_definition")
            .ok_or(LowerError::Missing("function header"))?;

        let (name, name_span) =
            self.identifier(definition.child_by_field_name("name"), "function name")?;

        let scope = match definition
            .child_by_field_name("scope")
            .and_then(first_token)
            .map(|token| token.kind())
        {
            Some("PRIVATE") => Scope::Private,
            _ => Scope::Public,
        };

        let return_type = match definition
            .child_by_field_name("returnType")
            .and_then(first_token)
        {
            Some(token) => match CicodeType::from_keyword(token.kind()) {
                Some(ty) => ReturnType::Value(ty),
                None => ReturnType::Void,
            },
            None => ReturnType::Void,
        };

        let mut parameters = Vec::new();
        if let Some(list) = definition.child_by_field_name("parameters") {
            for parameter in significant(list) {
                match self.parameter(parameter) {
                    Ok(parameter) => parameters.push(parameter),
                    Err(err) => self.report(parameter, err),
                }
            }
        }

        let mut locals = Vec::new();
        let declarations = parts
            .iter()
            .copied()
            .filter(|child| child.kind() == "variable_declaration");
        for declaration in declarations {
            match self.declaration(declaration) {
                Ok(declaration) => locals.push(declaration),
                Err(err) => self.report(declaration, err),
            }
        }

        let body = self.block(parts)?;
        let span = span(node);

        Ok(Item::new(
            self.db,
            ItemKind::Function(FunctionDefinition::new(
                self.db,
                name,
                name_span,
                scope,
                return_type,
                parameters,
                locals,
                body,
                doc,
                span,
            )),
            span,
        ))
    }

    fn type_of(&self, node: Option<Node<'_>>) -> LowerResult<CicodeType> {
        node.filter(|node| !node.is_missing())
            .and_then(first_token)
            .and_then(|token| CicodeType::from_keyword(token.kind()))
            .ok_or(LowerError::Missing("type"))
    }

    fn parameter(&self, node: Node<'_>) -> LowerResult<Parameter> {
        let ty = self.type_of(node.child_by_field_name("type"))?;
        let (name, _) = self.identifier(node.child_by_field_name("name"), "parameter name")?;
        let default = match node.child_by_field_name("defaultval") {
            Some(default) => {
                let value = significant(default)
                    .into_iter()
                    .next()
                    .ok_or(LowerError::Missing("default value"))?;
                Some(self.literal(value)?)
            }
            None => None,
        };
        Ok(Parameter {
            name,
            ty,
            default,
            span: span(node),
        })
    }

    fn literal(&self, node: Node<'_>) -> LowerResult<Literal> {
        if node.is_missing() {
            return Err(LowerError::Missing("value"));
        }
        let text = self.text(node)?;
        match node.kind() {
            "number" => parse_number(text).map(Literal::Number),
            "string" => Ok(Literal::String(unescape_string(text))),
            _ => Err(LowerError::Unexpected(text.to_string())),
        }
    }

    fn declaration(&self, node: Node<'_>) -> LowerResult<VariableDeclaration> {
        let ty = self.type_of(node.child_by_field_name("varType"))?;
        let mut variables: Vec<Variable> = Vec::new();

        for child in significant(node) {
            match child.kind() {
                "variable_name" => {
                    let (name, span) = self.identifier(Some(child), "variable name")?;
                    variables.push(Variable {
                        name,
                        initializer: None,
                        span,
                    });
                }
                "assign_to_value" => {
                    let value = significant(child)
                        .into_iter()
                        .next()
                        .ok_or(LowerError::Missing("initial value"))?;
                    let initializer = match value.kind() {
                        "variable_name" => {
                            Initializer::Variable(self.identifier(Some(value), "value")?.0)
                        }
                        _ => Initializer::Literal(self.literal(value)?),
                    };
                    if let Some(variable) = variables.last_mut() {
                        variable.span = variable.span.merge(span(child));
                        variable.initializer = Some((initializer, span(value)));
                    }
                }
                _ => {}
            }
        }

        Ok(VariableDeclaration {
            ty,
            variables,
            span: span(node),
        })
    }

    fn block<'tree>(&self, nodes: impl IntoIterator<Item = Node<'tree>>) -> LowerResult<Block> {
        let _nesting = self.nested()?;
        let mut statements = Vec::new();
        for child in nodes {
            let lowered = match child.kind() {
                "statement_or_expression" => self.statement(child),
                "return_statment" => self.return_statement(child),
                _ => continue,
            };
            match lowered {
                Ok(statement) => statements.push((statement, span(child))),
                Err(err) => self.report(child, err),
            }
        }
        Ok(Block { statements })
    }

    fn statement(&self, node: Node<'_>) -> LowerResult<Statement> {
        let inner = significant(node)
            .into_iter()
            .next()
            .ok_or(LowerError::Missing("statement"))?;
        match inner.kind() {
            "variable_assignment" => {
                let parts = significant(inner);
                let target = self.identifier(
                    parts.iter().copied().find(|child| child.kind() == "variable_name"),
                    "assignment target",
                )?;
                let value = parts
                    .iter()
                    .find(|child| child.kind() == "expression_variable_assignments")
                    .and_then(|value| significant(*value).into_iter().next())
                    .ok_or(LowerError::Missing("assigned value"))?;
                Ok(Statement::Assign(Assignment {
                    target,
                    value: self.expression(value)?,
                }))
            }
            "if_statement" => self.if_statement(inner).map(Statement::If),
            "function_call" => self.call(inner).map(Statement::Call),
            _ => Err(LowerError::Unexpected(self.text(inner)?.to_string())),
        }
    }

    fn if_statement(&self, node: Node<'_>) -> LowerResult<IfStatement> {
        let all = children(node);
        let condition = all
            .iter()
            .copied()
            .find(|child| child.kind() == "conditional_statement")
            .ok_or(LowerError::Missing("condition"))?;
        let condition = self.condition(condition)?;

        let else_index = all
            .iter()
            .position(|child| child.kind() == "ELSE" && !child.is_named());
        let (then_part, else_part) = all.split_at(else_index.unwrap_or(all.len()));
        let then_branch = self.block(then_part.iter().copied())?;
        let else_branch = match else_index {
            Some(_) => Some(self.block(else_part.iter().copied().skip(1))?),
            None => None,
        };

        Ok(IfStatement {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn return_statement(&self, node: Node<'_>) -> LowerResult<Statement> {
        let value = significant(node)
            .into_iter()
            .find(|child| child.kind() == "expression");
        let value = match value {
            Some(value) => Some(self.expression(value)?),
            None => None,
        };
        Ok(Statement::Return(value))
    }

    fn expression(&self, node: Node<'_>) -> LowerResult<Spanned<Expr>> {
        let _nesting = self.nested()?;
        match node.kind() {
            "expression" => match significant(node).as_slice() {
                [atom] if atom.kind() == "expression_atom" => self.atom(*atom),
                [atom] => self.expression(*atom),
                [left, operator, right] => {
                    let token = operator
                        .named_child(0)
                        .and_then(first_token)
                        .ok_or(LowerError::Missing("operator"))?;
                    let operator = BinaryOperator::from_token(token.kind())
                        .ok_or_else(|| LowerError::Unexpected(token.kind().to_string()))?;
                    Ok((
                        Expr::Binary(BinaryExpression {
                            left: Box::new(self.expression(*left)?),
                            operator,
                            right: Box::new(self.expression(*right)?),
                        }),
                        span(node),
                    ))
                }
                _ => Err(LowerError::Unexpected(self.text(node)?.to_string())),
            },
            "expression_atom" => self.atom(node),
            "function_call" => Ok((Expr::Call(self.call(node)?), span(node))),
            "variable_name" => {
                let (name, span) = self.identifier(Some(node), "expression")?;
                Ok((Expr::Variable(name), span))
            }
            "number" | "string" => {
                let expr = match self.literal(node)? {
                    Literal::Number(value) => Expr::Number(value),
                    Literal::String(value) => Expr::String(value),
                };
                Ok((expr, span(node)))
            }
            _ => Err(LowerError::Unexpected(self.text(node)?.to_string())),
        }
    }

    fn atom(&self, node: Node<'_>) -> LowerResult<Spanned<Expr>> {
        let first = first_token(node).ok_or(LowerError::Missing("expression"))?;
        let operand = || {
            significant(node)
                .into_iter()
                .next()
                .ok_or(LowerError::Missing("expression"))
        };
        match first.kind() {
            "-" => Ok((Expr::Negate(Box::new(self.expression(operand()?)?)), span(node))),
            "(" => {
                let (expr, _) = self.expression(operand()?)?;
                Ok((expr, span(node)))
            }
            "ERROR" => Err(LowerError::Unexpected(self.text(first)?.to_string())),
            _ if first.is_missing() => Err(LowerError::Missing("expression")),
            _ => self.expression(first),
        }
    }

    fn call(&self, node: Node<'_>) -> LowerResult<CallExpression> {
        let parts = significant(node);
        let (function, _) = self.identifier(
            parts.iter().copied().find(|child| child.kind() == "function_name"),
            "function name",
        )?;
        let arguments = parts
            .iter()
            .filter(|child| child.kind() == "expression")
            .map(|argument| self.expression(*argument))
            .collect::<LowerResult<Vec<_>>>()?;
        Ok(CallExpression {
            function,
            arguments,
        })
    }

    fn condition(&self, node: Node<'_>) -> LowerResult<Spanned<Condition>> {
        match significant(node).as_slice() {
            [operand] => match operand.kind() {
                "conditional_atom" => self.conditional_atom(*operand),
                "conditional_statement" => self.condition(*operand),
                _ => Ok((Condition::Expr(self.expression(*operand)?), span(node))),
            },
            [left, operator, right] => {
                let _nesting = self.nested()?;
                let token = operator
                    .named_child(0)
                    .and_then(first_token)
                    .ok_or(LowerError::Missing("operator"))?;
                let operator = ConditionOperator::from_token(token.kind())
                    .ok_or_else(|| LowerError::Unexpected(token.kind().to_string()))?;
                Ok((
                    Condition::Binary(ConditionExpression {
                        left: Box::new(self.condition(*left)?),
                        operator,
                        right: Box::new(self.condition(*right)?),
                    }),
                    span(node),
                ))
            }
            _ => Err(LowerError::Missing("condition")),
        }
    }

    fn conditional_atom(&self, node: Node<'_>) -> LowerResult<Spanned<Condition>> {
        let _nesting = self.nested()?;
        let first = first_token(node).ok_or(LowerError::Missing("condition"))?;
        let operand = significant(node)
            .into_iter()
            .next()
            .ok_or(LowerError::Missing("condition"))?;
        match first.kind() {
            "NOT" => {
                let inner = match operand.kind() {
                    "conditional_atom" => self.conditional_atom(operand)?,
                    _ => {
                        let expr = self.expression(operand)?;
                        let expr_span = expr.1;
                        (Condition::Expr(expr), expr_span)
                    }
                };
                Ok((Condition::Not(Box::new(inner)), span(node)))
            }
            "(" => {
                let (condition, _) = self.condition(operand)?;
                Ok((condition, span(node)))
            }
            _ => Ok((Condition::Expr(self.expression(operand)?), span(node))),
        }
    }
}

fn parse_number(text: &str) -> LowerResult<i64> {
    text.parse()
        .map_err(|_| LowerError::NumberOutOfRange(text.to_string()))
}

/// Strip the quotes of a string literal and resolve `^` escapes.
fn unescape_string(literal: &str) -> String {
    let body = literal.strip_prefix('"').unwrap_or(literal);
    let body = body.strip_suffix('"').unwrap_or(body);
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '^' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('^'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use salsa::Database;

    #[salsa::tracked]
    fn first_function_body(db: &dyn salsa::Database, source: SourceFile) -> Block {
        let program = parse_source_file(db, source);
        program
            .functions(db)
            .next()
            .map(|function| function.body(db).clone())
            .unwrap_or_default()
    }

    fn body_of(source: &str) -> Block {
        salsa::DatabaseImpl::default().attach(|db| {
            let file = SourceFile::new(db, "test.ci".into(), source.to_string());
            first_function_body(db, file)
        })
    }

    #[test]
    fn test_lower_error_messages() {
        assert_eq!(LowerError::Missing("type").to_string(), "missing type");
        assert_eq!(LowerError::Unexpected("*".into()).to_string(), "unexpected `*`");
        let err = parse_number("99999999999999999999").unwrap_err();
        assert_eq!(err.to_string(), "number `99999999999999999999` does not fit in 64 bits");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_unescape_string() {
        assert_eq!(unescape_string(r#""say ^"hi^"""#), "say \"hi\"");
        assert_eq!(unescape_string(r#""a^nb^^""#), "a\nb^");
    }

    #[test]
    fn test_parse_function_header() {
        salsa::DatabaseImpl::default().attach(|db| {
            let source = SourceFile::new(
                db,
                "header.ci".into(),
                "PRIVATE REAL FUNCTION Scale(REAL value, INT factor = 10, STRING unit = \"mm\")\nEND\n"
                    .to_string(),
            );
            let program = parse_source_file(db, source);
            let function = program.functions(db).next().unwrap();
            assert_eq!(function.name(db), "Scale");
            assert_eq!(function.scope(db), Scope::Private);
            assert_eq!(function.return_type(db), ReturnType::Value(CicodeType::Real));
            let parameters = function.parameters(db);
            assert_eq!(parameters.len(), 3);
            assert_eq!(parameters[0].ty, CicodeType::Real);
            assert_eq!(parameters[0].default, None);
            assert_eq!(parameters[1].default, Some(Literal::Number(10)));
            assert_eq!(parameters[2].default, Some(Literal::String("mm".into())));
            assert_eq!(function.name_span(db), Span::new(22, 27));
        });
    }

    #[test]
    fn test_defaults_for_omitted_scope_and_type() {
        salsa::DatabaseImpl::default().attach(|db| {
            let source = SourceFile::new(db, "f.ci".into(), "function f()\nend".to_string());
            let function = parse_source_file(db, source).functions(db).next().unwrap();
            assert_eq!(function.scope(db), Scope::Public);
            assert_eq!(function.return_type(db), ReturnType::Void);
            assert!(function.doc(db).is_none());
        });
    }

    #[test]
    fn test_locals() {
        salsa::DatabaseImpl::default().attach(|db| {
            let source = SourceFile::new(
                db,
                "locals.ci".into(),
                "FUNCTION F()\n INT a = 1, b;\n STRING s = a;\nEND".to_string(),
            );
            let function = parse_source_file(db, source).functions(db).next().unwrap();
            let locals = function.locals(db);
            assert_eq!(locals.len(), 2);
            assert_eq!(locals[0].ty, CicodeType::Int);
            let names: Vec<_> = locals[0].variables.iter().map(|v| v.name.as_str()).collect();
            assert_eq!(names, ["a", "b"]);
            assert_eq!(
                locals[0].variables[0].initializer.as_ref().map(|(init, _)| init),
                Some(&Initializer::Literal(Literal::Number(1)))
            );
            assert_eq!(
                locals[1].variables[0].initializer.as_ref().map(|(init, _)| init),
                Some(&Initializer::Variable("a".into()))
            );
        });
    }

    #[test]
    fn test_expression_shapes() {
        let body = body_of("FUNCTION F()\n x = -a + 2 * (b - 1);\nEND");
        let [(Statement::Assign(assignment), _)] = body.statements.as_slice() else {
            panic!("expected one assignment, got {body:?}");
        };
        assert_eq!(assignment.target.0, "x");
        let Expr::Binary(sum) = &assignment.value.0 else {
            panic!("expected a binary expression");
        };
        assert_eq!(sum.operator, BinaryOperator::Add);
        assert!(matches!(sum.left.0, Expr::Negate(_)));
        let Expr::Binary(product) = &sum.right.0 else {
            panic!("expected a product");
        };
        assert_eq!(product.operator, BinaryOperator::Multiply);
        assert_eq!(product.left.0, Expr::Number(2));
        assert!(matches!(&product.right.0, Expr::Binary(inner) if inner.operator == BinaryOperator::Subtract));
    }

    #[test]
    fn test_if_else_and_calls() {
        let body = body_of(
            "FUNCTION F()\n IF NOT Ready() OR level >= 3 THEN\n  Beep(1);\n ELSE\n  level = 0;\n  RETURN;\n END\nEND",
        );
        let [(Statement::If(if_statement), _)] = body.statements.as_slice() else {
            panic!("expected one IF, got {body:?}");
        };
        let Condition::Binary(condition) = &if_statement.condition.0 else {
            panic!("expected a binary condition");
        };
        assert_eq!(condition.operator, ConditionOperator::Or);
        assert!(matches!(condition.left.0, Condition::Not(_)));
        assert!(matches!(
            &if_statement.then_branch.statements[0].0,
            Statement::Call(call) if call.function == "Beep" && call.arguments.len() == 1
        ));
        let else_branch = if_statement.else_branch.as_ref().unwrap();
        assert_eq!(else_branch.statements.len(), 2);
        assert_eq!(else_branch.statements[1].0, Statement::Return(None));
        assert_eq!(body.walk().len(), 4);
    }

    #[test]
    fn test_statements_with_syntax_errors_are_dropped() {
        let body = body_of("FUNCTION F()\n x = ;\n y = 2;\nEND");
        assert_eq!(body.statements.len(), 1);
        assert!(matches!(&body.statements[0].0, Statement::Assign(a) if a.target.0 == "y"));
    }

    #[test]
    fn test_doc_comments_attach_to_next_function() {
        salsa::DatabaseImpl::default().attach(|db| {
            let source = SourceFile::new(
                db,
                "doc.ci".into(),
                "// <summary>First.</summary>\nFUNCTION A()\nEND\n// unrelated\nFUNCTION B()\nEND"
                    .to_string(),
            );
            let functions: Vec<_> = parse_source_file(db, source).functions(db).collect();
            assert_eq!(
                functions[0].doc(db).as_ref().and_then(|d| d.summary.as_deref()),
                Some("First.")
            );
            assert!(functions[1].doc(db).is_none());
        });
    }

    #[test]
    fn test_doc_params() {
        salsa::DatabaseImpl::default().attach(|db| {
            let text = "// <summary>Adds.</summary>\n// <param name=\"a\">First.</param>\n// <returns>Sum.</returns>\nINT FUNCTION Add(INT a)\n RETURN a;\nEND";
            let source = SourceFile::new(db, "doc.ci".into(), text.to_string());
            let function = parse_source_file(db, source).functions(db).next().unwrap();
            let doc = function.doc(db).as_ref().unwrap();
            assert_eq!(doc.summary.as_deref(), Some("Adds."));
            assert_eq!(doc.param("A"), Some("First."));
            assert_eq!(doc.returns.as_deref(), Some("Sum."));
            assert_eq!(&text[doc.params[0].span.start..doc.params[0].span.end], "// <param name=\"a\">");
        });
    }

    #[test]
    fn test_deep_nesting_is_reported() {
        let depth = 50_000;
        let text = format!(
            "FUNCTION F()\n x = {}1{};\n y = 2;\nEND",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        salsa::DatabaseImpl::default().attach(|db| {
            let source = SourceFile::new(db, "deep.ci".into(), text.clone());
            let diagnostics = parse_source_file::accumulated::<Diagnostic>(db, source);
            let [diagnostic] = diagnostics.as_slice() else {
                panic!("expected one diagnostic, got {diagnostics:?}");
            };
            assert_eq!(diagnostic.phase, CompilationPhase::AstGeneration);
            assert_eq!(
                diagnostic.message,
                format!("nested more than {MAX_NESTING} levels deep")
            );

            let function = parse_source_file(db, source).functions(db).next().unwrap();
            let statements = &function.body(db).statements;
            assert_eq!(statements.len(), 1);
            assert!(matches!(&statements[0].0, Statement::Assign(a) if a.target.0 == "y"));
        });
    }

    #[test]
    fn test_nesting_below_the_limit_lowers() {
        let depth = MAX_NESTING - 8;
        let body = body_of(&format!(
            "FUNCTION F()\n x = {}1{};\nEND",
            "(".repeat(depth),
            ")".repeat(depth)
        ));
        let [(Statement::Assign(assignment), _)] = body.statements.as_slice() else {
            panic!("expected one assignment, got {body:?}");
        };
        assert_eq!(assignment.value.0, Expr::Number(1));
    }
}
