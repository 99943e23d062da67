use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::text::normalize;

/// The two record kinds the system tracks. Goals are handled separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Income,
    Expense,
}

impl RecordKind {
    /// The Portuguese noun used in replies and as the description fallback.
    pub fn noun(self) -> &'static str {
        match self {
            RecordKind::Income => "receita",
            RecordKind::Expense => "despesa",
        }
    }

    pub fn categories(self) -> &'static [&'static str] {
        match self {
            RecordKind::Income => INCOME_CATEGORIES,
            RecordKind::Expense => EXPENSE_CATEGORIES,
        }
    }

    pub fn keyword_table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            RecordKind::Income => INCOME_KEYWORDS,
            RecordKind::Expense => EXPENSE_KEYWORDS,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

pub const INCOME_CATEGORIES: &[&str] = &[
    "Salário",
    "Freelance",
    "Investimentos",
    "Aluguel Recebido",
    "Comissão",
    "Bônus",
    "Outros",
];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Alimentação",
    "Aluguel",
    "Carne",
    "Crédito",
    "Débito",
    "Diversos",
    "Empréstimo",
    "Financiamento",
    "Gás",
    "Hipermercado",
    "Locação",
    "Uber/Transporte",
    "Vestuário",
];

// Keyword → category tables for the chat path. Declaration order is the scan
// order; keywords are stored pre-normalized (lowercase, no diacritics) since
// matching always runs on normalized text.
pub const EXPENSE_KEYWORDS: &[(&str, &str)] = &[
    ("alimentacao", "Alimentação"),
    ("comida", "Alimentação"),
    ("restaurante", "Alimentação"),
    ("lanche", "Alimentação"),
    ("ifood", "Alimentação"),
    ("mercado", "Hipermercado"),
    ("hipermercado", "Hipermercado"),
    ("supermercado", "Hipermercado"),
    ("compras", "Hipermercado"),
    ("aluguel", "Aluguel"),
    ("moradia", "Aluguel"),
    ("condominio", "Aluguel"),
    ("carne", "Carne"),
    ("acougue", "Carne"),
    ("credito", "Crédito"),
    ("cartao", "Crédito"),
    ("debito", "Débito"),
    ("emprestimo", "Empréstimo"),
    ("financiamento", "Financiamento"),
    ("parcela", "Financiamento"),
    ("gas", "Gás"),
    ("botijao", "Gás"),
    ("uber", "Uber/Transporte"),
    ("transporte", "Uber/Transporte"),
    ("onibus", "Uber/Transporte"),
    ("gasolina", "Uber/Transporte"),
    ("combustivel", "Uber/Transporte"),
    ("99", "Uber/Transporte"),
    ("roupa", "Vestuário"),
    ("vestuario", "Vestuário"),
    ("calcado", "Vestuário"),
    ("tenis", "Vestuário"),
    ("locacao", "Locação"),
    ("luz", "Diversos"),
    ("agua", "Diversos"),
    ("internet", "Diversos"),
    ("telefone", "Diversos"),
    ("celular", "Diversos"),
    ("conta", "Diversos"),
];

pub const INCOME_KEYWORDS: &[(&str, &str)] = &[
    ("salario", "Salário"),
    ("holerite", "Salário"),
    ("pagamento", "Salário"),
    ("freelance", "Freelance"),
    ("freela", "Freelance"),
    ("bico", "Freelance"),
    ("extra", "Freelance"),
    ("investimento", "Investimentos"),
    ("investimentos", "Investimentos"),
    ("rendimento", "Investimentos"),
    ("dividendo", "Investimentos"),
    ("juros", "Investimentos"),
    ("aluguel recebido", "Aluguel Recebido"),
    ("inquilino", "Aluguel Recebido"),
    ("comissao", "Comissão"),
    ("bonus", "Bônus"),
    ("bonificacao", "Bônus"),
    ("13", "Bônus"),
    ("decimo", "Bônus"),
];

/// Spreadsheet category labels → system categories, used by the ingestion
/// path. Matching is exact first, then partial containment either way.
pub const SHEET_CATEGORIES: &[(&str, &str)] = &[
    ("carne", "Carne"),
    ("divida", "Crédito"),
    ("emprestimo", "Empréstimo"),
    ("consorcio", "Financiamento"),
    ("locacao", "Locação"),
    ("credito", "Crédito"),
    ("financiamento", "Financiamento"),
    ("alimentacao", "Alimentação"),
    ("veiculo", "Uber/Transporte"),
    ("moto", "Uber/Transporte"),
    ("utilidades", "Diversos"),
    ("saude", "Diversos"),
    ("outros", "Diversos"),
    ("aluguel", "Aluguel"),
    ("hipermercado", "Hipermercado"),
    ("supermercado", "Hipermercado"),
    ("gas", "Gás"),
    ("vestuario", "Vestuário"),
    ("transporte", "Uber/Transporte"),
    ("debito", "Débito"),
    ("salario", "Salário"),
    ("freelance", "Freelance"),
    ("investimentos", "Investimentos"),
    ("investimento", "Investimentos"),
    ("aluguel recebido", "Aluguel Recebido"),
    ("comissao", "Comissão"),
    ("bonus", "Bônus"),
];

/// Category used when no keyword matches. One definition shared by the chat
/// and ingestion paths.
pub fn fallback_category(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Income => "Outros",
        RecordKind::Expense => "Diversos",
    }
}

/// Date used when none could be extracted or coerced: today.
pub fn default_date() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Best-guess category for a free-text message: first keyword (in table
/// order) whose normalized form occurs in the normalized text wins.
pub fn guess_category(kind: RecordKind, text: &str) -> &'static str {
    let normalized = normalize(text);
    for (keyword, category) in kind.keyword_table() {
        if normalized.contains(keyword) {
            return category;
        }
    }
    fallback_category(kind)
}

/// Maps a raw spreadsheet category label onto a canonical category of the
/// given kind. Unknown or cross-kind labels degrade to the fallback.
pub fn resolve_sheet_category(kind: RecordKind, raw: &str) -> &'static str {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return fallback_category(kind);
    }

    let mapped = SHEET_CATEGORIES
        .iter()
        .find(|(key, _)| *key == normalized)
        .or_else(|| {
            SHEET_CATEGORIES
                .iter()
                .find(|(key, _)| normalized.contains(key) || key.contains(&normalized))
        })
        .map(|(_, category)| *category);

    match mapped {
        Some(category) if kind.categories().contains(&category) => category,
        _ => fallback_category(kind),
    }
}
