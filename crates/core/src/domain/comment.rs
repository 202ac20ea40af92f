use serde::Deserialize;
use serde_json::Value;

use super::document::DocumentData;
use super::input::required_text;
use crate::clock::ServerTimestamp;
use crate::errors::DomainError;

pub mod fields {
    pub const FIRST_NAME: &str = "nombreUsuario";
    pub const LAST_NAME: &str = "apellidoUsuario";
    pub const EMAIL: &str = "correoUsuario";
    pub const BODY: &str = "comentario";
    pub const CREATED_AT: &str = "fecha";
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentDraft {
    #[serde(default, rename = "nombreUsuario")]
    pub first_name: Option<Value>,
    #[serde(default, rename = "apellidoUsuario")]
    pub last_name: Option<Value>,
    #[serde(default, rename = "correoUsuario")]
    pub email: Option<Value>,
    #[serde(default, rename = "comentario")]
    pub body: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewComment {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub body: String,
}

impl CommentDraft {
    /// Any missing or blank field yields the same "all fields required" error.
    pub fn validate(self) -> Result<NewComment, DomainError> {
        let all_required = |_| DomainError::MissingFields;
        Ok(NewComment {
            first_name: required_text(self.first_name, fields::FIRST_NAME).map_err(all_required)?,
            last_name: required_text(self.last_name, fields::LAST_NAME).map_err(all_required)?,
            email: required_text(self.email, fields::EMAIL).map_err(all_required)?,
            body: required_text(self.body, fields::BODY).map_err(all_required)?,
        })
    }
}

impl NewComment {
    pub fn into_document(self, created_at: ServerTimestamp) -> DocumentData {
        let mut data = DocumentData::new();
        data.insert(fields::FIRST_NAME.to_string(), Value::String(self.first_name));
        data.insert(fields::LAST_NAME.to_string(), Value::String(self.last_name));
        data.insert(fields::EMAIL.to_string(), Value::String(self.email));
        data.insert(fields::BODY.to_string(), Value::String(self.body));
        data.insert(fields::CREATED_AT.to_string(), Value::from(created_at));
        data
    }
}
