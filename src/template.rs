//! A small directive language for component templates.
//!
//! Literal text passes through unchanged. Actions are enclosed in `{{` and `}}`:
//!
//! - `{{.Field}}` interpolates a field as HTML-escaped text,
//! - `{{if <arg>}}`, `{{else}}` and `{{end}}` select output by truthiness,
//! - `{{render <arg>}}` emits component markers,
//! - `{{bind "Field"}}` and `{{on "event" "Handler"}}` emit marker attributes,
//! - `{{classIf "class" <arg>}}` emits `" class"` iff `<arg>` is truthy.
//!
//! Arguments are double-quoted strings (with `\"` and `\\` escapes), `true`, `false`, integers or `.Field` references.

use crate::{
	component::Value,
	error::{ExpandError, TemplateError},
};
use tracing::trace;

/// What actions resolve against while expanding.
pub trait Directives {
	/// # Errors
	///
	/// Iff there is no field called `name`.
	fn field(&self, name: &str) -> Result<Value, TemplateError>;

	/// Registers nested components and returns their markers.
	fn render(&mut self, value: Value) -> String;

	/// # Errors
	///
	/// Iff there is no field called `field`.
	fn bind(&mut self, field: &str) -> Result<String, TemplateError>;

	/// # Errors
	///
	/// Iff there is no handler called `handler`.
	fn on(&mut self, event: &str, handler: &str) -> Result<String, TemplateError>;
}

/// `" "` followed by the trimmed `class` iff `condition`, otherwise the empty string.
#[must_use]
pub fn class_if(class: &str, condition: bool) -> String {
	if condition {
		format!(" {}", class.trim())
	} else {
		String::new()
	}
}

/// Replaces `&`, `<`, `>`, `"` and `'` with character references.
#[must_use]
pub fn escape(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&#34;"),
			'\'' => escaped.push_str("&#39;"),
			c => escaped.push(c),
		}
	}
	escaped
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
	Str(String),
	Word(String),
}

struct Branch {
	/// Whether the enclosing context emits output.
	outer: bool,
	condition: bool,
	in_else: bool,
}
impl Branch {
	fn active(&self) -> bool {
		self.outer && (self.condition != self.in_else)
	}
}

/// Expands `source` against `directives`.
///
/// # Errors
///
/// On the first malformed or unresolvable action.
/// Expansion stops there; [`ExpandError::partial`] contains the output produced up to that point.
pub fn expand(source: &str, directives: &mut dyn Directives) -> Result<String, ExpandError> {
	let mut output = String::with_capacity(source.len());
	match expand_into(source, directives, &mut output) {
		Ok(()) => Ok(output),
		Err(source) => Err(ExpandError { partial: output, source }),
	}
}

fn expand_into(source: &str, directives: &mut dyn Directives, output: &mut String) -> Result<(), TemplateError> {
	let mut branches: Vec<Branch> = Vec::new();
	let mut rest = source;
	let mut offset = 0;
	while let Some(start) = rest.find("{{") {
		if active(&branches) {
			output.push_str(&rest[..start]);
		}
		let action_offset = offset + start;
		let after = &rest[start + 2..];
		let end = after.find("}}").ok_or(TemplateError::Unterminated { offset: action_offset })?;
		let tokens = tokenize(after[..end].trim())?;
		rest = &after[end + 2..];
		offset = action_offset + 2 + end + 2;

		let (head, args) = match tokens.split_first() {
			Some((Token::Word(head), args)) => (head.as_str(), args),
			Some((Token::Str(_), _)) => return Err(TemplateError::UnknownFunction("(string literal)".to_owned())),
			None => return Err(TemplateError::EmptyAction { offset: action_offset }),
		};
		trace!(action = head, args = args.len(), "Expanding action.");

		match head {
			"if" => {
				arity("if", args, 1)?;
				let outer = active(&branches);
				let condition = outer && evaluate(&args[0], &*directives)?.is_truthy();
				branches.push(Branch { outer, condition, in_else: false });
			}
			"else" => {
				arity("else", args, 0)?;
				match branches.last_mut() {
					Some(branch) if !branch.in_else => branch.in_else = true,
					_ => return Err(TemplateError::Unbalanced("else")),
				}
			}
			"end" => {
				arity("end", args, 0)?;
				branches.pop().ok_or(TemplateError::Unbalanced("end"))?;
			}
			_ if !active(&branches) => (),
			"render" => {
				arity("render", args, 1)?;
				let value = evaluate(&args[0], &*directives)?;
				output.push_str(&directives.render(value));
			}
			"bind" => {
				arity("bind", args, 1)?;
				let field = string_argument("bind", args, 0)?;
				output.push_str(&directives.bind(field)?);
			}
			"on" => {
				arity("on", args, 2)?;
				let event = string_argument("on", args, 0)?;
				let handler = string_argument("on", args, 1)?;
				output.push_str(&directives.on(event, handler)?);
			}
			"classIf" => {
				arity("classIf", args, 2)?;
				let class = string_argument("classIf", args, 0)?;
				let condition = evaluate(&args[1], &*directives)?.is_truthy();
				output.push_str(&class_if(class, condition));
			}
			field if field.starts_with('.') => {
				if !args.is_empty() {
					return Err(TemplateError::Arity { function: "interpolation", expected: 0, found: args.len() });
				}
				let name = &field[1..];
				let text = directives.field(name)?.to_text().ok_or_else(|| TemplateError::NotText(name.to_owned()))?;
				output.push_str(&escape(&text));
			}
			unknown => return Err(TemplateError::UnknownFunction(unknown.to_owned())),
		}
	}

	if !branches.is_empty() {
		return Err(TemplateError::UnclosedIf);
	}
	output.push_str(rest);
	Ok(())
}

fn active(branches: &[Branch]) -> bool {
	branches.last().map_or(true, Branch::active)
}

fn arity(function: &'static str, args: &[Token], expected: usize) -> Result<(), TemplateError> {
	if args.len() == expected {
		Ok(())
	} else {
		Err(TemplateError::Arity { function, expected, found: args.len() })
	}
}

fn string_argument<'a>(function: &'static str, args: &'a [Token], index: usize) -> Result<&'a str, TemplateError> {
	match &args[index] {
		Token::Str(s) => Ok(s),
		Token::Word(_) => Err(TemplateError::ExpectedString { function, position: index + 1 }),
	}
}

fn evaluate(token: &Token, directives: &dyn Directives) -> Result<Value, TemplateError> {
	match token {
		Token::Str(s) => Ok(Value::Text(s.clone())),
		Token::Word(word) => match word.as_str() {
			"true" => Ok(Value::Bool(true)),
			"false" => Ok(Value::Bool(false)),
			field if field.starts_with('.') && field.len() > 1 => directives.field(&field[1..]),
			other => other.parse().map(Value::Int).map_err(|_| TemplateError::BadArgument(other.to_owned())),
		},
	}
}

fn tokenize(action: &str) -> Result<Vec<Token>, TemplateError> {
	let mut tokens = Vec::new();
	let mut chars = action.chars().peekable();
	while let Some(&c) = chars.peek() {
		if c.is_whitespace() {
			chars.next();
		} else if c == '"' {
			chars.next();
			let mut s = String::new();
			loop {
				match chars.next() {
					Some('"') => break,
					Some('\\') => match chars.next() {
						Some(escaped @ ('"' | '\\')) => s.push(escaped),
						Some('n') => s.push('\n'),
						Some(other) => return Err(TemplateError::BadArgument(format!("\\{}", other))),
						None => return Err(TemplateError::BadArgument(format!("\"{}", s))),
					},
					Some(c) => s.push(c),
					None => return Err(TemplateError::BadArgument(format!("\"{}", s))),
				}
			}
			tokens.push(Token::Str(s));
		} else {
			let mut word = String::new();
			while let Some(&c) = chars.peek() {
				if c.is_whitespace() || c == '"' {
					break;
				}
				word.push(c);
				chars.next();
			}
			tokens.push(Token::Word(word));
		}
	}
	Ok(tokens)
}
