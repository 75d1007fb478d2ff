//! The declarative grammar model: languages, statement templates, and
//! requirements.
//!
//! A [`Language`] is data, not code: an ordered list of named
//! [`StatementTemplate`]s, each an ordered list of [`Requirement`]s. The
//! parser tries templates in declaration order, so order is part of the
//! grammar's meaning and is preserved through (de)serialization.
//!
//! Grammars are exchanged as JSON documents shaped like:
//!
//! ```json
//! {
//!   "name": "minits",
//!   "statementTemplates": [
//!     {
//!       "id": "assignment",
//!       "requirements": [
//!         { "type": "token", "tokenType": "iden" },
//!         { "type": "token", "tokenType": "oper", "tokenData": "=" },
//!         { "type": "statement" },
//!         { "type": "token", "tokenType": "term", "tokenData": ";" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! [`Language::from_definition`] validates eagerly: template ids must be
//! unique, requirement fields must be consistent with their `type`, and
//! every referenced `statementId` must resolve. A grammar that loads is a
//! grammar the parser can run.
//!
//! # Repeat semantics
//!
//! The document `repeat` field is read as the TOTAL number of required
//! matches: absent or `1` means exactly one, `n >= 1` means exactly `n`
//! consecutive matches, and `-1` means zero-or-more (match until the first
//! failure; zero matches is acceptable and never a failure). `0`, values
//! below `-1`, and counts past `u32::MAX` are rejected when the document
//! loads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{error, Error, ErrorKind, Result};

/// How many times a requirement must match.
///
/// See the module docs for how this maps to the document `repeat` integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Exactly `n` consecutive matches required; `n` is at least 1.
    Exactly(u32),
    /// Zero or more matches: evaluated repeatedly until the first failure,
    /// which is not itself a failure.
    ZeroOrMore,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Exactly(1)
    }
}

impl Repeat {
    /// Parses the document integer form (`-1` or a count `>= 1`).
    pub fn from_document(raw: i64) -> Result<Repeat> {
        if raw == -1 {
            return Ok(Repeat::ZeroOrMore);
        }
        match u32::try_from(raw) {
            Ok(n) if n >= 1 => Ok(Repeat::Exactly(n)),
            _ => error(
                ErrorKind::Grammar,
                format!(
                    "invalid repeat {} (expected -1 or a count from 1 to {})",
                    raw,
                    u32::MAX
                ),
            ),
        }
    }

    /// The document integer form of this repeat.
    pub fn to_document(self) -> i64 {
        match self {
            Repeat::Exactly(n) => i64::from(n),
            Repeat::ZeroOrMore => -1,
        }
    }
}

/// What a single requirement asks of the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementKind {
    /// Consume one token matching the given constraints. An absent
    /// constraint is a wildcard for that field.
    Token {
        token_type: Option<String>,
        token_data: Option<String>,
    },
    /// Recursively match a statement at the current position.
    ///
    /// With an id, exactly that template is tried; this is the only way an
    /// abstract template can ever match. Without an id, every non-abstract
    /// template is tried in declaration order, exactly as at top level.
    Statement { statement_id: Option<String> },
}

/// One element of a statement template: a token constraint or a reference
/// to another template, with a repeat count.
///
/// Requirements are immutable values; build them with the constructors and
/// [`Requirement::with_repeat`], not field mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub kind: RequirementKind,
    pub repeat: Repeat,
}

impl Requirement {
    /// A token requirement constrained by kind only.
    pub fn token(token_type: impl Into<String>) -> Self {
        Self {
            kind: RequirementKind::Token {
                token_type: Some(token_type.into()),
                token_data: None,
            },
            repeat: Repeat::default(),
        }
    }

    /// A token requirement constrained by kind and exact matched text.
    pub fn token_data(token_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            kind: RequirementKind::Token {
                token_type: Some(token_type.into()),
                token_data: Some(data.into()),
            },
            repeat: Repeat::default(),
        }
    }

    /// A token requirement with no constraints; matches any single token.
    pub fn any_token() -> Self {
        Self {
            kind: RequirementKind::Token {
                token_type: None,
                token_data: None,
            },
            repeat: Repeat::default(),
        }
    }

    /// A statement requirement targeting one template id.
    pub fn statement(statement_id: impl Into<String>) -> Self {
        Self {
            kind: RequirementKind::Statement {
                statement_id: Some(statement_id.into()),
            },
            repeat: Repeat::default(),
        }
    }

    /// A statement requirement matched by any non-abstract template.
    pub fn any_statement() -> Self {
        Self {
            kind: RequirementKind::Statement { statement_id: None },
            repeat: Repeat::default(),
        }
    }

    /// Returns the requirement with a different repeat count.
    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    fn from_def(def: &RequirementDef, template_id: &str) -> Result<Requirement> {
        let repeat = match def.repeat {
            Some(raw) => Repeat::from_document(raw)?,
            None => Repeat::default(),
        };
        let kind = match def.kind {
            RequirementTypeDef::Token => {
                if def.statement_id.is_some() {
                    return error(
                        ErrorKind::Grammar,
                        format!(
                            "template \"{}\": token requirement cannot set statementId",
                            template_id
                        ),
                    );
                }
                RequirementKind::Token {
                    token_type: def.token_type.clone(),
                    token_data: def.token_data.clone(),
                }
            }
            RequirementTypeDef::Statement => {
                if def.token_type.is_some() || def.token_data.is_some() {
                    return error(
                        ErrorKind::Grammar,
                        format!(
                            "template \"{}\": statement requirement cannot set tokenType or tokenData",
                            template_id
                        ),
                    );
                }
                RequirementKind::Statement {
                    statement_id: def.statement_id.clone(),
                }
            }
        };
        Ok(Requirement { kind, repeat })
    }

    fn to_def(&self) -> RequirementDef {
        let repeat = match self.repeat {
            Repeat::Exactly(1) => None,
            other => Some(other.to_document()),
        };
        match &self.kind {
            RequirementKind::Token {
                token_type,
                token_data,
            } => RequirementDef {
                kind: RequirementTypeDef::Token,
                token_type: token_type.clone(),
                token_data: token_data.clone(),
                statement_id: None,
                repeat,
            },
            RequirementKind::Statement { statement_id } => RequirementDef {
                kind: RequirementTypeDef::Statement,
                token_type: None,
                token_data: None,
                statement_id: statement_id.clone(),
                repeat,
            },
        }
    }
}

/// A named grammar rule: an ordered requirement sequence.
///
/// Requirements match in order (sequence, not alternatives). Alternation is
/// expressed between templates, not within one: the parser tries templates
/// in declaration order and commits to the first that satisfies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementTemplate {
    id: String,
    is_abstract: bool,
    requirements: Vec<Requirement>,
}

impl StatementTemplate {
    /// Creates an empty non-abstract template.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_abstract: false,
            requirements: Vec::new(),
        }
    }

    /// Creates an empty abstract template: never matched standalone, only
    /// through an explicit `statementId` reference.
    pub fn new_abstract(id: impl Into<String>) -> Self {
        Self {
            is_abstract: true,
            ..Self::new(id)
        }
    }

    /// Unique id of this template within its language.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this template is reachable only via explicit reference.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Requirements in match order.
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Appends a requirement.
    ///
    /// Adding a value-identical requirement twice fails; a repeated match is
    /// expressed with [`Requirement::with_repeat`], not duplicate entries.
    pub fn add_requirement(&mut self, req: Requirement) -> Result<()> {
        if self.requirements.contains(&req) {
            return error(
                ErrorKind::DuplicateRequirement,
                format!(
                    "template \"{}\": identical requirement added twice, use repeat instead",
                    self.id
                ),
            );
        }
        self.requirements.push(req);
        Ok(())
    }

    fn from_def(def: &StatementTemplateDef) -> Result<StatementTemplate> {
        let mut template = if def.is_abstract {
            StatementTemplate::new_abstract(&def.id)
        } else {
            StatementTemplate::new(&def.id)
        };
        for req_def in &def.requirements {
            template.add_requirement(Requirement::from_def(req_def, &def.id)?)?;
        }
        Ok(template)
    }

    fn to_def(&self) -> StatementTemplateDef {
        StatementTemplateDef {
            id: self.id.clone(),
            is_abstract: self.is_abstract,
            requirements: self.requirements.iter().map(Requirement::to_def).collect(),
        }
    }
}

/// A complete declarative grammar.
///
/// Templates live in a declaration-ordered list (that order is the parser's
/// trial order) with an id index for O(1) reference resolution. Read-only
/// once built; construction goes through [`Language::add_template`] /
/// [`Language::create_template`] or [`Language::from_definition`].
#[derive(Debug, Clone)]
pub struct Language {
    name: String,
    templates: Vec<StatementTemplate>,
    index: HashMap<String, usize>,
}

impl Language {
    /// Creates an empty language.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            templates: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Name of the language this grammar describes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if a template with this id exists.
    pub fn has_template(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Looks up a template by id.
    pub fn template(&self, id: &str) -> Option<&StatementTemplate> {
        self.template_index(id).map(|i| &self.templates[i])
    }

    /// Position of a template in declaration order.
    pub fn template_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// All templates in declaration (= trial) order.
    pub fn templates(&self) -> &[StatementTemplate] {
        &self.templates
    }

    /// Adds a fully-built template; id collisions are caller errors.
    pub fn add_template(&mut self, template: StatementTemplate) -> Result<()> {
        if self.has_template(template.id()) {
            return error(
                ErrorKind::DuplicateTemplate,
                format!(
                    "cannot add statement template \"{}\" more than once",
                    template.id()
                ),
            );
        }
        self.index
            .insert(template.id().to_string(), self.templates.len());
        self.templates.push(template);
        Ok(())
    }

    /// Adds an empty non-abstract template and returns it for requirement
    /// building.
    pub fn create_template(&mut self, id: impl Into<String>) -> Result<&mut StatementTemplate> {
        self.add_template(StatementTemplate::new(id))?;
        let last = self.templates.len() - 1;
        Ok(&mut self.templates[last])
    }

    /// Checks that every statement reference resolves to a template in this
    /// language.
    ///
    /// [`Language::from_definition`] calls this; programmatically-built
    /// grammars should call it once construction is complete, before
    /// parsing with them.
    pub fn validate(&self) -> Result<()> {
        for template in &self.templates {
            for req in template.requirements() {
                if let RequirementKind::Statement {
                    statement_id: Some(id),
                } = &req.kind
                {
                    if !self.has_template(id) {
                        return Err(Error::new(
                            ErrorKind::UnresolvedReference,
                            format!(
                                "template \"{}\" requires unknown statement template \"{}\"",
                                template.id(),
                                id
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Builds and validates a language from its document form.
    pub fn from_definition(def: &LanguageDef) -> Result<Language> {
        let mut language = Language::new(&def.name);
        for template_def in &def.statement_templates {
            language.add_template(StatementTemplate::from_def(template_def)?)?;
        }
        language.validate()?;
        Ok(language)
    }

    /// The document form of this language.
    ///
    /// Round-trips with [`Language::from_definition`] up to key order and
    /// elision of default field values (`repeat: 1`, `abstract: false`).
    pub fn to_definition(&self) -> LanguageDef {
        LanguageDef {
            name: self.name.clone(),
            statement_templates: self.templates.iter().map(StatementTemplate::to_def).collect(),
        }
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Document form of a requirement's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementTypeDef {
    Token,
    Statement,
}

/// Document form of a [`Requirement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RequirementDef {
    #[serde(rename = "type")]
    pub kind: RequirementTypeDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<i64>,
}

/// Document form of a [`StatementTemplate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatementTemplateDef {
    pub id: String,
    #[serde(rename = "abstract", default, skip_serializing_if = "is_false")]
    pub is_abstract: bool,
    pub requirements: Vec<RequirementDef>,
}

/// Document form of a [`Language`]; the unit of grammar serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LanguageDef {
    pub name: String,
    pub statement_templates: Vec<StatementTemplateDef>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    fn assign_def() -> LanguageDef {
        LanguageDef {
            name: "mini".into(),
            statement_templates: vec![StatementTemplateDef {
                id: "assign".into(),
                is_abstract: false,
                requirements: vec![
                    RequirementDef {
                        kind: RequirementTypeDef::Token,
                        token_type: Some(Token::IDENTIFIER.into()),
                        token_data: None,
                        statement_id: None,
                        repeat: None,
                    },
                    RequirementDef {
                        kind: RequirementTypeDef::Token,
                        token_type: Some(Token::OPERATOR.into()),
                        token_data: Some("=".into()),
                        statement_id: None,
                        repeat: None,
                    },
                    RequirementDef {
                        kind: RequirementTypeDef::Token,
                        token_type: Some(Token::NUMBER_LITERAL.into()),
                        token_data: None,
                        statement_id: None,
                        repeat: None,
                    },
                    RequirementDef {
                        kind: RequirementTypeDef::Token,
                        token_type: Some(Token::TERMINATOR.into()),
                        token_data: Some(";".into()),
                        statement_id: None,
                        repeat: None,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_definition_round_trip_is_identity() {
        let def = assign_def();
        let lang = Language::from_definition(&def).expect("well-formed definition");
        assert_eq!(lang.to_definition(), def);
    }

    #[test]
    fn test_json_round_trip_is_identity() {
        let def = assign_def();
        let json = serde_json::to_string(&def).expect("serialize");
        let back: LanguageDef = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, def);
    }

    #[test]
    fn test_document_field_names_are_camel_case() {
        let json = serde_json::to_string(&assign_def()).expect("serialize");
        assert!(json.contains("\"statementTemplates\""));
        assert!(json.contains("\"tokenType\""));
        assert!(json.contains("\"tokenData\""));
        assert!(json.contains("\"type\":\"token\""));
    }

    #[test]
    fn test_explicit_default_repeat_loads_like_absent() {
        let mut def = assign_def();
        def.statement_templates[0].requirements[0].repeat = Some(1);
        let explicit = Language::from_definition(&def).expect("load");
        let implicit = Language::from_definition(&assign_def()).expect("load");
        assert_eq!(explicit.to_definition(), implicit.to_definition());
    }

    #[test]
    fn test_repeat_document_values() {
        assert_eq!(Repeat::from_document(-1).unwrap(), Repeat::ZeroOrMore);
        assert_eq!(Repeat::from_document(1).unwrap(), Repeat::Exactly(1));
        assert_eq!(Repeat::from_document(4).unwrap(), Repeat::Exactly(4));
        assert_eq!(
            Repeat::from_document(0).unwrap_err().kind,
            ErrorKind::Grammar
        );
        assert_eq!(
            Repeat::from_document(-2).unwrap_err().kind,
            ErrorKind::Grammar
        );
        assert_eq!(Repeat::ZeroOrMore.to_document(), -1);
        assert_eq!(Repeat::Exactly(3).to_document(), 3);
    }

    #[test]
    fn test_repeat_count_past_u32_range_is_rejected() {
        let max = i64::from(u32::MAX);
        assert_eq!(
            Repeat::from_document(max).unwrap(),
            Repeat::Exactly(u32::MAX)
        );
        // 2^32 + 1 would wrap to 1 under a plain cast.
        let err = Repeat::from_document(max + 2).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Grammar);
        assert!(err.msg.contains("4294967297"), "got: {}", err.msg);
    }

    #[test]
    fn test_duplicate_template_id_is_rejected() {
        let mut lang = Language::new("dup");
        lang.add_template(StatementTemplate::new("stmt")).unwrap();
        let err = lang
            .add_template(StatementTemplate::new("stmt"))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateTemplate);
    }

    #[test]
    fn test_duplicate_requirement_value_is_rejected() {
        let mut template = StatementTemplate::new("pair");
        template
            .add_requirement(Requirement::token(Token::IDENTIFIER))
            .unwrap();
        let err = template
            .add_requirement(Requirement::token(Token::IDENTIFIER))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateRequirement);

        // Differing repeat makes a different value, which is allowed.
        template
            .add_requirement(Requirement::token(Token::IDENTIFIER).with_repeat(Repeat::Exactly(2)))
            .unwrap();
    }

    #[test]
    fn test_unresolved_statement_reference_fails_validation() {
        let mut lang = Language::new("dangling");
        let template = lang.create_template("call").unwrap();
        template
            .add_requirement(Requirement::statement("missing"))
            .unwrap();
        let err = lang.validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvedReference);
        assert!(err.msg.contains("missing"));
    }

    #[test]
    fn test_from_definition_validates_references() {
        let mut def = assign_def();
        def.statement_templates[0].requirements.push(RequirementDef {
            kind: RequirementTypeDef::Statement,
            token_type: None,
            token_data: None,
            statement_id: Some("nowhere".into()),
            repeat: None,
        });
        let err = Language::from_definition(&def).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvedReference);
    }

    #[test]
    fn test_mixed_requirement_fields_are_rejected() {
        let mut def = assign_def();
        def.statement_templates[0].requirements[0].statement_id = Some("assign".into());
        let err = Language::from_definition(&def).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Grammar);
    }

    #[test]
    fn test_templates_keep_declaration_order() {
        let mut lang = Language::new("ordered");
        for id in ["first", "second", "third"] {
            lang.add_template(StatementTemplate::new(id)).unwrap();
        }
        let ids: Vec<&str> = lang.templates().iter().map(|t| t.id()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
        assert_eq!(lang.template_index("second"), Some(1));
        assert!(lang.template("third").is_some());
        assert!(lang.template("fourth").is_none());
    }

    #[test]
    fn test_abstract_flag_survives_round_trip() {
        let mut def = assign_def();
        def.statement_templates.push(StatementTemplateDef {
            id: "value".into(),
            is_abstract: true,
            requirements: vec![RequirementDef {
                kind: RequirementTypeDef::Token,
                token_type: Some(Token::NUMBER_LITERAL.into()),
                token_data: None,
                statement_id: None,
                repeat: None,
            }],
        });
        let lang = Language::from_definition(&def).expect("load");
        assert!(lang.template("value").unwrap().is_abstract());
        assert_eq!(lang.to_definition(), def);

        let json = serde_json::to_string(&lang.to_definition()).expect("serialize");
        assert!(json.contains("\"abstract\":true"));
    }
}
