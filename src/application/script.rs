//! Edit scripts: one descriptor tree call per line.
//!
//! ```text
//! # comment
//! append microservice
//! append operation 0
//! append pattern service 0
//! append pattern operation 0 1
//! append dependency 0 1
//! append generator
//! append chaosmonkey
//! remove <same targets as append>
//! set microservices.0.name frontend
//! ```
//!
//! The value of a `set` line is the rest of the line after the field path,
//! trimmed. It may be empty or contain spaces; validation decides.

use crate::domain::{DescriptorTree, DomainResult, FieldPath, PatternOwner};

/// Sequence addressed by an append or remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Microservice,
    Operation { service: usize },
    Pattern(PatternOwner),
    Dependency { service: usize, operation: usize },
    Generator,
    Chaosmonkey,
}

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    Append(EditTarget),
    Remove(EditTarget),
    Set { path: FieldPath, value: String },
}

impl EditCommand {
    /// Apply this command to `tree`.
    pub fn apply(&self, tree: &mut DescriptorTree) -> DomainResult<()> {
        match self {
            EditCommand::Append(target) => {
                match *target {
                    EditTarget::Microservice => {
                        tree.append_microservice();
                    }
                    EditTarget::Operation { service } => {
                        tree.append_operation(service)?;
                    }
                    EditTarget::Pattern(owner) => {
                        tree.append_pattern(owner)?;
                    }
                    EditTarget::Dependency { service, operation } => {
                        tree.append_dependency(service, operation)?;
                    }
                    EditTarget::Generator => {
                        tree.append_generator();
                    }
                    EditTarget::Chaosmonkey => {
                        tree.append_chaosmonkey();
                    }
                }
                Ok(())
            }
            EditCommand::Remove(target) => {
                match *target {
                    EditTarget::Microservice => tree.remove_microservice()?,
                    EditTarget::Operation { service } => tree.remove_operation(service)?,
                    EditTarget::Pattern(owner) => tree.remove_pattern(owner)?,
                    EditTarget::Dependency { service, operation } => {
                        tree.remove_dependency(service, operation)?
                    }
                    EditTarget::Generator => tree.remove_generator()?,
                    EditTarget::Chaosmonkey => tree.remove_chaosmonkey()?,
                };
                Ok(())
            }
            EditCommand::Set { path, value } => tree.set_field(path, value),
        }
    }
}

fn parse_index(token: Option<&str>, what: &str) -> Result<usize, String> {
    let token = token.ok_or_else(|| format!("missing {} index", what))?;
    token
        .parse::<usize>()
        .map_err(|_| format!("bad {} index {:?}", what, token))
}

fn parse_target<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<EditTarget, String> {
    let kind = tokens.next().ok_or("missing target")?;
    let target = match kind {
        "microservice" => EditTarget::Microservice,
        "operation" => EditTarget::Operation {
            service: parse_index(tokens.next(), "service")?,
        },
        "pattern" => match tokens.next() {
            Some("service") => {
                EditTarget::Pattern(PatternOwner::Service(parse_index(tokens.next(), "service")?))
            }
            Some("operation") => {
                let service = parse_index(tokens.next(), "service")?;
                let operation = parse_index(tokens.next(), "operation")?;
                EditTarget::Pattern(PatternOwner::Operation { service, operation })
            }
            other => {
                return Err(format!(
                    "pattern owner must be 'service' or 'operation', got {:?}",
                    other.unwrap_or("")
                ))
            }
        },
        "dependency" => {
            let service = parse_index(tokens.next(), "service")?;
            let operation = parse_index(tokens.next(), "operation")?;
            EditTarget::Dependency { service, operation }
        }
        "generator" => EditTarget::Generator,
        "chaosmonkey" => EditTarget::Chaosmonkey,
        other => return Err(format!("unknown target {:?}", other)),
    };
    if let Some(extra) = tokens.next() {
        return Err(format!("unexpected argument {:?}", extra));
    }
    Ok(target)
}

/// Parse one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<EditCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim_start();
    let command = match verb {
        "append" => EditCommand::Append(parse_target(rest.split_whitespace())?),
        "remove" => EditCommand::Remove(parse_target(rest.split_whitespace())?),
        "set" => {
            if rest.is_empty() {
                return Err("missing field path".to_string());
            }
            let (path, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            EditCommand::Set {
                path: path.parse().map_err(|e: crate::domain::DomainError| e.to_string())?,
                value: value.trim().to_string(),
            }
        }
        other => return Err(format!("unknown command {:?}", other)),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::path::MicroserviceField;

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# append microservice").unwrap(), None);
    }

    #[test]
    fn test_set_keeps_inner_spaces_of_value() {
        let command = parse_line("set microservices.0.name   abc def  ").unwrap();
        assert_eq!(
            command,
            Some(EditCommand::Set {
                path: FieldPath::Microservice {
                    service: 0,
                    field: MicroserviceField::Name,
                },
                value: "abc def".to_string(),
            })
        );
    }

    #[test]
    fn test_operation_pattern_target() {
        let command = parse_line("remove pattern operation 1 2").unwrap();
        assert_eq!(
            command,
            Some(EditCommand::Remove(EditTarget::Pattern(
                PatternOwner::Operation {
                    service: 1,
                    operation: 2
                }
            )))
        );
    }

    #[test]
    fn test_malformed_lines_are_errors() {
        assert!(parse_line("append").is_err());
        assert!(parse_line("append operation").is_err());
        assert!(parse_line("append generator 3").is_err());
        assert!(parse_line("append pattern cluster 0").is_err());
        assert!(parse_line("rename microservice").is_err());
        assert!(parse_line("set").is_err());
    }
}
