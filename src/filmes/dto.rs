use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    UtcOffset,
};

use super::repo_types::{Filme, NewFilme};
use crate::error::AppError;
use crate::json::present;

pub const DESCRICAO_MAX_CHARS: usize = 144;

const TITLE_REQUIRED: &str = "O campo nomeFilme é obrigatório";
const DESCRICAO_TOO_LONG: &str = "A descrição deve ter no máximo 144 caracteres";
const INVALID_DATE: &str = "Data inválida para dataAssistir";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFilmeRequest {
    pub nome_filme: Option<String>,
    pub imagem_filme: Option<String>,
    pub data_assistir: Option<String>,
    pub descricao: Option<String>,
}

/// Partial update. Outer `None` = field absent, `Some(None)` = explicit null.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFilmeRequest {
    #[serde(default, deserialize_with = "present")]
    pub nome_filme: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub imagem_filme: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub data_assistir: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub descricao: Option<Option<String>>,
    /// Owner can never be changed; accepted only so it can be dropped.
    #[serde(default)]
    pub usuario: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct FilmePayload {
    pub filme: Filme,
}

#[derive(Debug, Serialize)]
pub struct FilmeListPayload {
    pub quantidade: usize,
    pub filmes: Vec<Filme>,
}

impl CreateFilmeRequest {
    pub fn validate(self) -> Result<NewFilme, AppError> {
        let nome_filme = required_title(self.nome_filme.as_deref())?;
        let descricao = optional_text(self.descricao);
        check_descricao(descricao.as_deref())?;
        let data_assistir = match self.data_assistir.as_deref() {
            Some(raw) => parse_data_assistir(raw)?,
            None => None,
        };
        Ok(NewFilme {
            nome_filme,
            imagem_filme: optional_text(self.imagem_filme),
            data_assistir,
            descricao,
        })
    }
}

impl UpdateFilmeRequest {
    /// Drops the owner field; returns whether it was present.
    pub fn strip_owner(&mut self) -> bool {
        self.usuario.take().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nome_filme.is_none()
            && self.imagem_filme.is_none()
            && self.data_assistir.is_none()
            && self.descricao.is_none()
    }

    /// Merges the present fields into `filme` and re-validates the result.
    pub fn apply(self, mut filme: Filme) -> Result<Filme, AppError> {
        if let Some(nome) = self.nome_filme {
            filme.nome_filme = required_title(nome.as_deref())?;
        }
        if let Some(imagem) = self.imagem_filme {
            filme.imagem_filme = optional_text(imagem);
        }
        if let Some(data) = self.data_assistir {
            filme.data_assistir = match data.as_deref() {
                Some(raw) => parse_data_assistir(raw)?,
                None => None,
            };
        }
        if let Some(descricao) = self.descricao {
            filme.descricao = optional_text(descricao);
        }
        check_descricao(filme.descricao.as_deref())?;
        Ok(filme)
    }
}

fn required_title(raw: Option<&str>) -> Result<String, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::validation(TITLE_REQUIRED))
}

fn optional_text(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

fn check_descricao(descricao: Option<&str>) -> Result<(), AppError> {
    match descricao {
        Some(d) if d.chars().count() > DESCRICAO_MAX_CHARS => {
            Err(AppError::validation(DESCRICAO_TOO_LONG))
        }
        _ => Ok(()),
    }
}

/// Accepts RFC 3339 (`toISOString()` output) or a bare `YYYY-MM-DD`, taken as midnight UTC.
/// Blank means "no date". The result is in UTC and always representable as RFC 3339.
pub fn parse_data_assistir(raw: &str) -> Result<Option<OffsetDateTime>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let date_only = format_description!("[year]-[month]-[day]");
    let ts = OffsetDateTime::parse(raw, &Rfc3339)
        .or_else(|_| Date::parse(raw, &date_only).map(|d| d.midnight().assume_utc()))
        .map_err(|_| AppError::validation(INVALID_DATE))?
        .to_offset(UtcOffset::UTC);

    // RFC 3339 only has four unsigned year digits.
    if !(0..=9999).contains(&ts.year()) {
        return Err(AppError::validation(INVALID_DATE));
    }
    Ok(Some(ts))
}
