//! # Training Artifacts
//!
//! The knowledge used to ground SQL generation comes in three shapes: DDL, free-form
//! documentation and question/SQL pairs. Each is stored as a canonical JSON document
//! whose first field is the dataset tag, and identified by a hash of that document
//! plus a type suffix.

use crate::{
    constants::DEFAULT_DATASET,
    ids::{canonical_json, training_id},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The three kinds of training data, one collection each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingDataType {
    Sql,
    Ddl,
    Documentation,
}

impl TrainingDataType {
    /// All types, in the order used when listing training data.
    pub const ALL: [TrainingDataType; 3] = [
        TrainingDataType::Ddl,
        TrainingDataType::Sql,
        TrainingDataType::Documentation,
    ];

    /// The name of the collection (table) holding this type.
    pub fn collection_name(&self) -> &'static str {
        match self {
            TrainingDataType::Sql => "sql",
            TrainingDataType::Ddl => "ddl",
            TrainingDataType::Documentation => "documentation",
        }
    }

    /// The suffix appended to identifiers of this type.
    pub fn id_suffix(&self) -> &'static str {
        match self {
            TrainingDataType::Sql => "sql",
            TrainingDataType::Ddl => "ddl",
            TrainingDataType::Documentation => "doc",
        }
    }

    /// Resolves the type of a stored identifier from its suffix.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| id.ends_with(&format!("-{}", t.id_suffix())))
    }
}

impl fmt::Display for TrainingDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

impl FromStr for TrainingDataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sql" => Ok(TrainingDataType::Sql),
            "ddl" => Ok(TrainingDataType::Ddl),
            "documentation" => Ok(TrainingDataType::Documentation),
            other => Err(format!("{other} is unknown")),
        }
    }
}

/// A question paired with the SQL that answers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSqlDocument {
    pub dataset: String,
    pub question: String,
    pub sql: String,
}

/// A schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdlDocument {
    pub dataset: String,
    pub ddl: String,
}

/// Free-form documentation about the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationDocument {
    pub dataset: String,
    pub documentation: String,
}

/// A training artifact in its stored form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrainingDocument {
    QuestionSql(QuestionSqlDocument),
    Ddl(DdlDocument),
    Documentation(DocumentationDocument),
}

impl TrainingDocument {
    pub fn question_sql(question: &str, sql: &str, dataset: Option<&str>) -> Self {
        TrainingDocument::QuestionSql(QuestionSqlDocument {
            dataset: dataset.unwrap_or(DEFAULT_DATASET).to_string(),
            question: question.to_string(),
            sql: sql.to_string(),
        })
    }

    pub fn ddl(ddl: &str, dataset: Option<&str>) -> Self {
        TrainingDocument::Ddl(DdlDocument {
            dataset: dataset.unwrap_or(DEFAULT_DATASET).to_string(),
            ddl: ddl.to_string(),
        })
    }

    pub fn documentation(documentation: &str, dataset: Option<&str>) -> Self {
        TrainingDocument::Documentation(DocumentationDocument {
            dataset: dataset.unwrap_or(DEFAULT_DATASET).to_string(),
            documentation: documentation.to_string(),
        })
    }

    pub fn data_type(&self) -> TrainingDataType {
        match self {
            TrainingDocument::QuestionSql(_) => TrainingDataType::Sql,
            TrainingDocument::Ddl(_) => TrainingDataType::Ddl,
            TrainingDocument::Documentation(_) => TrainingDataType::Documentation,
        }
    }

    pub fn dataset(&self) -> &str {
        match self {
            TrainingDocument::QuestionSql(d) => &d.dataset,
            TrainingDocument::Ddl(d) => &d.dataset,
            TrainingDocument::Documentation(d) => &d.dataset,
        }
    }

    /// True when any required text field is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        match self {
            TrainingDocument::QuestionSql(d) => {
                d.question.trim().is_empty() || d.sql.trim().is_empty()
            }
            TrainingDocument::Ddl(d) => d.ddl.trim().is_empty(),
            TrainingDocument::Documentation(d) => d.documentation.trim().is_empty(),
        }
    }

    /// The canonical JSON document that is embedded, stored and hashed.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        match self {
            TrainingDocument::QuestionSql(d) => canonical_json(d),
            TrainingDocument::Ddl(d) => canonical_json(d),
            TrainingDocument::Documentation(d) => canonical_json(d),
        }
    }

    /// Computes the content-addressed identifier of this document.
    pub fn id(&self) -> Result<String, serde_json::Error> {
        let document = self.to_canonical_json()?;
        Ok(training_id(&document, self.data_type().id_suffix()))
    }

    /// Parses a stored document of a known type.
    pub fn parse(data_type: TrainingDataType, json: &str) -> Result<Self, serde_json::Error> {
        Ok(match data_type {
            TrainingDataType::Sql => TrainingDocument::QuestionSql(serde_json::from_str(json)?),
            TrainingDataType::Ddl => TrainingDocument::Ddl(serde_json::from_str(json)?),
            TrainingDataType::Documentation => {
                TrainingDocument::Documentation(serde_json::from_str(json)?)
            }
        })
    }

    /// Flattens the document into a listing row.
    pub fn into_row(self, id: String) -> TrainingDataRow {
        let training_data_type = self.data_type();
        let (dataset, question, content) = match self {
            TrainingDocument::QuestionSql(d) => (d.dataset, Some(d.question), d.sql),
            TrainingDocument::Ddl(d) => (d.dataset, None, d.ddl),
            TrainingDocument::Documentation(d) => (d.dataset, None, d.documentation),
        };
        TrainingDataRow {
            id,
            dataset,
            question,
            content,
            training_data_type,
        }
    }
}

/// One row of a training data listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingDataRow {
    pub id: String,
    pub dataset: String,
    pub question: Option<String>,
    pub content: String,
    pub training_data_type: TrainingDataType,
}
