//! Calculator capability served by the `calculator-mcp` binary.
//!
//! Expressions are restricted to numbers, whitespace and `+ - * / ( )` and
//! evaluated with a small recursive-descent parser, so there is no `eval`
//! surface to escape from.

use serde_json::Value;

use crate::mcp::{ServerTool, ToolDescriptor};

/// Descriptor published via `tools/list`.
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "calculate".to_string(),
        description: "Evaluate a math expression. Use only numbers and operators: \
                      + - * / ( ). Example: (2 + 3) * 4"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "required": ["expression"],
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Math expression to evaluate, e.g. '2 + 3 * 4' or '(10 - 2) / 4'",
                },
            },
        }),
    }
}

/// The `calculate` tool, ready to register with an [`crate::mcp::McpServer`].
pub fn tool() -> ServerTool {
    ServerTool::new(descriptor(), |args: &Value| {
        let expression = match args["expression"] {
            Value::String(ref s) => s.clone(),
            ref other => other.to_string(),
        };
        evaluate(&expression).map(format_number)
    })
}

/// Evaluate an expression, enforcing the allowed character set first.
pub fn evaluate(expression: &str) -> Result<f64, String> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err("Empty expression".to_string());
    }
    if let Some(bad) = expression
        .chars()
        .find(|c| !c.is_ascii_digit() && !c.is_whitespace() && !"+-*/().".contains(*c))
    {
        return Err(format!(
            "Only numbers and + - * / ( ) are allowed (found '{}')",
            bad
        ));
    }

    let mut parser = Parser::new(expression);
    let value = parser.expression()?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(format!("Unexpected character '{}'", c));
    }
    Ok(value)
}

/// Render integral values without a fractional part, others in plain decimal.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Recursive-descent parser: expression -> term -> factor, with `( )` and
/// unary minus at the factor level.
struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn expression(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('+') => {
                    self.bump();
                    value += self.term()?;
                }
                Some('-') => {
                    self.bump();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.factor()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('*') => {
                    self.bump();
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.bump();
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err("Division by zero".to_string());
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> Result<f64, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.bump();
                let value = self.expression()?;
                self.skip_whitespace();
                if self.bump() != Some(')') {
                    return Err("Missing closing parenthesis".to_string());
                }
                Ok(value)
            }
            Some('-') => {
                self.bump();
                Ok(-self.factor()?)
            }
            Some('+') => {
                self.bump();
                self.factor()
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(format!("Unexpected character '{}'", c)),
            None => Err("Unexpected end of expression".to_string()),
        }
    }

    fn number(&mut self) -> Result<f64, String> {
        let mut literal = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() && c != '.' {
                break;
            }
            literal.push(c);
            self.bump();
        }
        literal
            .parse::<f64>()
            .map_err(|_| format!("Invalid number '{}'", literal))
    }
}
