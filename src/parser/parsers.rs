use crate::lexer::Token;
use crate::parser::ast::*;
use crate::utils::Span;
use chumsky::input::ValueInput;
use chumsky::prelude::*;

pub(super) type ParseError<'a> = extra::Err<Rich<'a, Token, Span>>;

/// 后缀运算：`[expr]`、`.ident`、`.ident(args)`
enum Postfix {
    Index(Expr),
    Field(Identifier),
    Method(Identifier, Vec<Expr>),
}

fn fold_binary(left: Expr, (op, right): (BinaryOp, Expr)) -> Expr {
    let span = left.span.join(right.span);
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

/// 构建完整的 chumsky 解析器。
/// 此函数为内部实现细节，仅对父模块 `mod.rs` 可见。
pub(super) fn program_parser<'a, I>() -> impl Parser<'a, I, Program, ParseError<'a>>
where
    I: Input<'a, Token = Token, Span = Span> + ValueInput<'a>,
{
    let ident = ident_parser();
    let type_ = type_parser().boxed();
    let expr = expr_parser().boxed();
    let semicolon = just(Token::Semicolon);

    // --- 变量声明 ---
    let variable = type_.clone().then(ident.clone());
    let var_decl = variable
        .clone()
        .then_ignore(semicolon.clone())
        .map_with(|(ty, name), e| VarDecl {
            name,
            ty,
            span: e.span(),
        })
        .labelled("variable declaration")
        .boxed();

    // --- 语句和代码块 ---
    let mut stmt = Recursive::declare();

    let block = var_decl
        .clone()
        .repeated()
        .collect::<Vec<_>>()
        .then(stmt.clone().repeated().collect::<Vec<_>>())
        .delimited_by(just(Token::LBrace), just(Token::RBrace))
        .map_with(|(decls, stmts), e| Block {
            decls,
            stmts,
            span: e.span(),
            scope: Slot::default(),
        })
        .labelled("block")
        .boxed();

    let test = expr
        .clone()
        .delimited_by(just(Token::LParen), just(Token::RParen));

    stmt.define(
        choice((
            block.clone().map(Stmt::Block),
            just(Token::If)
                .ignore_then(test.clone())
                .then(stmt.clone())
                .then(just(Token::Else).ignore_then(stmt.clone()).or_not())
                .map_with(|((test, then_branch), else_branch), e| {
                    Stmt::If(IfStmt {
                        test,
                        then_branch: Box::new(then_branch),
                        else_branch: else_branch.map(Box::new),
                        span: e.span(),
                    })
                }),
            just(Token::While)
                .ignore_then(test.clone())
                .then(stmt.clone())
                .map_with(|(test, body), e| {
                    Stmt::While(WhileStmt {
                        test,
                        body: Box::new(body),
                        span: e.span(),
                        scope: Slot::default(),
                    })
                }),
            just(Token::For)
                .ignore_then(
                    expr.clone()
                        .or_not()
                        .then_ignore(semicolon.clone())
                        .then(expr.clone())
                        .then_ignore(semicolon.clone())
                        .then(expr.clone().or_not())
                        .delimited_by(just(Token::LParen), just(Token::RParen)),
                )
                .then(stmt.clone())
                .map_with(|(((init, test), step), body), e| {
                    Stmt::For(ForStmt {
                        init,
                        test,
                        step,
                        body: Box::new(body),
                        span: e.span(),
                        scope: Slot::default(),
                    })
                }),
            just(Token::Break)
                .then_ignore(semicolon.clone())
                .map_with(|_, e| Stmt::Break(e.span())),
            just(Token::Return)
                .ignore_then(expr.clone().or_not())
                .then_ignore(semicolon.clone())
                .map_with(|value, e| {
                    Stmt::Return(ReturnStmt {
                        value,
                        span: e.span(),
                    })
                }),
            just(Token::Print)
                .ignore_then(
                    expr.clone()
                        .separated_by(just(Token::Comma))
                        .at_least(1)
                        .collect::<Vec<_>>()
                        .delimited_by(just(Token::LParen), just(Token::RParen)),
                )
                .then_ignore(semicolon.clone())
                .map_with(|args, e| {
                    Stmt::Print(PrintStmt {
                        args,
                        span: e.span(),
                    })
                }),
            expr.clone().then_ignore(semicolon.clone()).map(Stmt::Expr),
            semicolon.clone().map_with(|_, e| Stmt::Empty(e.span())),
        ))
        .labelled("statement"),
    );

    // --- 函数与原型 ---
    let return_type = type_.clone().or(just(Token::Void).map_with(|_, e| TypeExpr {
        kind: TypeExprKind::Void,
        span: e.span(),
    }));

    let formals = variable
        .map_with(|(ty, name), e| VarDecl {
            name,
            ty,
            span: e.span(),
        })
        .separated_by(just(Token::Comma))
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LParen), just(Token::RParen));

    let signature = return_type.then(ident.clone()).then(formals).boxed();

    let fn_decl = signature
        .clone()
        .then(block)
        .map_with(|(((return_type, name), formals), body), e| FnDecl {
            name,
            return_type,
            formals,
            body: Some(body),
            span: e.span(),
            scope: Slot::default(),
        })
        .labelled("function declaration")
        .boxed();

    let prototype = signature
        .then_ignore(semicolon)
        .map_with(|((return_type, name), formals), e| FnDecl {
            name,
            return_type,
            formals,
            body: None,
            span: e.span(),
            scope: Slot::default(),
        })
        .labelled("prototype");

    // --- 类与接口 ---
    let field = choice((
        var_decl.clone().map(Decl::Variable),
        fn_decl.clone().map(Decl::Function),
    ));

    let class_decl = just(Token::Class)
        .ignore_then(ident.clone())
        .then(just(Token::Extends).ignore_then(ident.clone()).or_not())
        .then(
            just(Token::Implements)
                .ignore_then(
                    ident
                        .clone()
                        .separated_by(just(Token::Comma))
                        .at_least(1)
                        .collect::<Vec<_>>(),
                )
                .or_not(),
        )
        .then(
            field
                .repeated()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        )
        .map_with(|(((name, extends), implements), members), e| ClassDecl {
            name,
            extends,
            implements: implements.unwrap_or_default(),
            members,
            span: e.span(),
            scope: Slot::default(),
        })
        .labelled("class declaration");

    let interface_decl = just(Token::Interface)
        .ignore_then(ident)
        .then(
            prototype
                .repeated()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        )
        .map_with(|(name, members), e| InterfaceDecl {
            name,
            members,
            span: e.span(),
            scope: Slot::default(),
        })
        .labelled("interface declaration");

    // --- 顶层 ---
    let decl = choice((
        var_decl.map(Decl::Variable),
        fn_decl.map(Decl::Function),
        class_decl.map(Decl::Class),
        interface_decl.map(Decl::Interface),
    ))
    .boxed();

    decl.repeated()
        .at_least(1)
        .collect()
        .map_with(|decls, e| Program {
            decls,
            span: e.span(),
            scope: Slot::default(),
        })
        .then_ignore(end())
}

fn ident_parser<'a, I>() -> impl Parser<'a, I, Identifier, ParseError<'a>> + Clone
where
    I: Input<'a, Token = Token, Span = Span> + ValueInput<'a>,
{
    select! { Token::Ident(name) = e => Identifier { name, span: e.span() } }.labelled("identifier")
}

/// 类型：基础类型或类名，后面可以跟任意多个 `[]`
fn type_parser<'a, I>() -> impl Parser<'a, I, TypeExpr, ParseError<'a>> + Clone
where
    I: Input<'a, Token = Token, Span = Span> + ValueInput<'a>,
{
    let base_type = select! {
        Token::Int = e => TypeExpr { kind: TypeExprKind::Int, span: e.span() },
        Token::Double = e => TypeExpr { kind: TypeExprKind::Double, span: e.span() },
        Token::Bool = e => TypeExpr { kind: TypeExprKind::Bool, span: e.span() },
        Token::String = e => TypeExpr { kind: TypeExprKind::String, span: e.span() },
        Token::Ident(name) = e => TypeExpr {
            kind: TypeExprKind::Named(Identifier { name, span: e.span() }),
            span: e.span(),
        },
    };

    let brackets = just(Token::LBracket)
        .then(just(Token::RBracket))
        .map_with(|_, e| e.span());

    base_type
        .foldl(brackets.repeated(), |elem, close: Span| TypeExpr {
            span: elem.span.join(close),
            kind: TypeExprKind::Array(Box::new(elem)),
        })
        .labelled("type")
}

/// 表达式解析器，优先级从低到高：
/// `=`、`||`、`&&`、`== !=`、`< <= > >=`、`+ -`、`* / %`、一元 `- !`、后缀 `[] .`
fn expr_parser<'a, I>() -> impl Parser<'a, I, Expr, ParseError<'a>> + Clone
where
    I: Input<'a, Token = Token, Span = Span> + ValueInput<'a>,
{
    recursive(|expr| {
        let ident = ident_parser();
        let actuals = expr
            .clone()
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LParen), just(Token::RParen));
        let empty_parens = just(Token::LParen).then(just(Token::RParen));

        // --- 原子表达式 ---
        let constant = select! {
            Token::IntConstant(value) => ExprKind::IntConstant(value),
            Token::DoubleConstant(value) => ExprKind::DoubleConstant(value),
            Token::BoolConstant(value) => ExprKind::BoolConstant(value),
            Token::StringConstant(value) => ExprKind::StringConstant(value),
            Token::Null => ExprKind::Null,
            Token::This => ExprKind::This,
        }
        .map_with(|kind, e| Expr::new(kind, e.span()));

        let read_integer = just(Token::ReadInteger)
            .then(empty_parens.clone())
            .map_with(|_, e| Expr::new(ExprKind::ReadInteger, e.span()));
        let read_line = just(Token::ReadLine)
            .then(empty_parens)
            .map_with(|_, e| Expr::new(ExprKind::ReadLine, e.span()));

        let new_object = just(Token::New)
            .ignore_then(
                ident
                    .clone()
                    .delimited_by(just(Token::LParen), just(Token::RParen)),
            )
            .map_with(|class, e| Expr::new(ExprKind::New { class }, e.span()));

        let new_array = just(Token::NewArray)
            .ignore_then(
                expr.clone()
                    .then_ignore(just(Token::Comma))
                    .then(type_parser())
                    .delimited_by(just(Token::LParen), just(Token::RParen)),
            )
            .map_with(|(size, elem_type), e| {
                Expr::new(
                    ExprKind::NewArray {
                        size: Box::new(size),
                        elem_type,
                    },
                    e.span(),
                )
            });

        // 裸标识符：后面有实参列表就是函数调用，否则是变量访问
        let named = ident
            .clone()
            .then(actuals.clone().or_not())
            .map_with(|(name, args), e| match args {
                Some(args) => Expr::new(
                    ExprKind::Call {
                        base: None,
                        method: name,
                        args,
                    },
                    e.span(),
                ),
                None => Expr::new(
                    ExprKind::FieldAccess {
                        base: None,
                        field: name,
                    },
                    e.span(),
                ),
            });

        let atom = choice((
            constant,
            read_integer,
            read_line,
            new_object,
            new_array,
            named,
            expr.clone()
                .delimited_by(just(Token::LParen), just(Token::RParen)),
        ))
        .labelled("expression")
        .boxed();

        // --- 后缀链 ---
        let postfix_op = choice((
            expr.clone()
                .delimited_by(just(Token::LBracket), just(Token::RBracket))
                .map(Postfix::Index),
            just(Token::Dot)
                .ignore_then(ident)
                .then(actuals.or_not())
                .map(|(name, args)| match args {
                    Some(args) => Postfix::Method(name, args),
                    None => Postfix::Field(name),
                }),
        ))
        .map_with(|op, e| (op, e.span()));

        let postfix = atom
            .foldl(postfix_op.repeated(), |base, (op, end): (Postfix, Span)| {
                let span = base.span.join(end);
                let base = Box::new(base);
                let kind = match op {
                    Postfix::Index(subscript) => ExprKind::ArrayAccess {
                        base,
                        subscript: Box::new(subscript),
                    },
                    Postfix::Field(field) => ExprKind::FieldAccess {
                        base: Some(base),
                        field,
                    },
                    Postfix::Method(method, args) => ExprKind::Call {
                        base: Some(base),
                        method,
                        args,
                    },
                };
                Expr::new(kind, span)
            })
            .boxed();

        // --- 运算符优先级 ---
        let unary_op = choice((
            just(Token::Minus).to(UnaryOp::Negate),
            just(Token::Not).to(UnaryOp::Not),
        ))
        .map_with(|op, e| (op, e.span()));

        let unary = unary_op
            .repeated()
            .foldr(postfix, |(op, start): (UnaryOp, Span), operand: Expr| {
                let span = start.join(operand.span);
                Expr::new(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                )
            })
            .boxed();

        let product_op = select! {
            Token::Star => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
            Token::Percent => BinaryOp::Mod,
        };
        let product = unary
            .clone()
            .foldl(product_op.then(unary).repeated(), fold_binary)
            .boxed();

        let sum_op = select! {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
        };
        let sum = product
            .clone()
            .foldl(sum_op.then(product).repeated(), fold_binary)
            .boxed();

        let relational_op = select! {
            Token::Lt => BinaryOp::Lt,
            Token::Lte => BinaryOp::Lte,
            Token::Gt => BinaryOp::Gt,
            Token::Gte => BinaryOp::Gte,
        };
        let relation = sum
            .clone()
            .foldl(relational_op.then(sum).repeated(), fold_binary)
            .boxed();

        let equality_op = select! {
            Token::Eq => BinaryOp::Eq,
            Token::NotEq => BinaryOp::NotEq,
        };
        let equality = relation
            .clone()
            .foldl(equality_op.then(relation).repeated(), fold_binary)
            .boxed();

        let logical_and = equality
            .clone()
            .foldl(
                just(Token::And).to(BinaryOp::And).then(equality).repeated(),
                fold_binary,
            )
            .boxed();

        let logical_or = logical_and
            .clone()
            .foldl(
                just(Token::Or).to(BinaryOp::Or).then(logical_and).repeated(),
                fold_binary,
            )
            .boxed();

        // 赋值是右结合的，左侧必须是可赋值的位置
        logical_or
            .then(just(Token::Assign).ignore_then(expr).or_not())
            .validate(|(target, value), e, emitter| match value {
                Some(value) => {
                    if !target.is_lvalue() {
                        emitter.emit(Rich::custom(
                            target.span,
                            "cannot assign to this expression",
                        ));
                    }
                    Expr::new(
                        ExprKind::Assign {
                            target: Box::new(target),
                            value: Box::new(value),
                        },
                        e.span(),
                    )
                }
                None => target,
            })
            .labelled("expression")
    })
}
