use finbot_core::normalize;
use serde::{Deserialize, Serialize};

use crate::extract::extract_value;

/// The single classified purpose of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Help,
    Summary,
    ListGoals,
    AddGoal,
    DeleteIncome,
    DeleteExpense,
    TogglePaid,
    ListIncome,
    ListExpense,
    AddIncome,
    AddExpense,
    Unrecognized,
}

// Keyword groups, stored pre-normalized (lowercase, diacritics stripped).
// Membership is plain substring containment over the normalized message, so
// short entries like "por" can fire inside longer words; that looseness is
// part of the observed behavior.
const INCOME_WORDS: &[&str] = &[
    "receita", "entrada", "renda", "ganho", "ganhei", "recebi", "receber",
];
const EXPENSE_WORDS: &[&str] = &[
    "despesa", "gasto", "gastei", "conta", "pagar", "pagamento", "paguei", "boleto", "fatura",
];
const ADD_WORDS: &[&str] = &[
    "adicionar", "adiciona", "incluir", "inclui", "lancar", "lanca", "registrar", "registra",
    "colocar", "coloca", "botar", "bota", "nova", "novo", "por",
];
const LIST_WORDS: &[&str] = &[
    "listar", "lista", "mostrar", "mostra", "ver", "quais", "minhas", "meus",
];
const DELETE_WORDS: &[&str] = &[
    "deletar", "deleta", "remover", "remove", "excluir", "exclui", "apagar", "apaga",
];
const PAID_WORDS: &[&str] = &["pagar", "paga", "paguei", "marcar", "marca", "quitar", "quitei"];
const SUMMARY_WORDS: &[&str] = &[
    "resumo", "saldo", "balanco", "quanto", "total", "como estou", "situacao",
];
const GOAL_WORDS: &[&str] = &["meta", "objetivo", "guardar", "juntar", "economizar", "poupar"];
const HELP_WORDS: &[&str] = &[
    "ajuda", "help", "comandos", "o que voce faz", "como funciona", "oi", "ola",
];

/// Classifies a message by evaluating the keyword groups and resolving them
/// through a fixed priority cascade. Groups are not mutually exclusive;
/// first match wins, so the ordering below is load-bearing.
pub fn classify(text: &str) -> Intent {
    let lower = normalize(text);
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    let has_add = has(ADD_WORDS);
    let has_list = has(LIST_WORDS);
    let has_delete = has(DELETE_WORDS);
    let has_paid = has(PAID_WORDS);
    let has_income = has(INCOME_WORDS);
    let has_expense = has(EXPENSE_WORDS);
    let has_summary = has(SUMMARY_WORDS);
    let has_goal = has(GOAL_WORDS);
    let has_help = has(HELP_WORDS);

    if has_help && !(has_add || has_list || has_delete || has_paid || has_income || has_expense) {
        return Intent::Help;
    }
    if has_summary {
        return Intent::Summary;
    }
    if has_goal && has_list {
        return Intent::ListGoals;
    }
    // "meta viagem 5000" carries no add keyword; a goal word next to an
    // extractable value is also an add-goal command.
    if has_goal && (has_add || extract_value(text).is_some()) {
        return Intent::AddGoal;
    }
    if has_delete && has_income {
        return Intent::DeleteIncome;
    }
    if has_delete && has_expense {
        return Intent::DeleteExpense;
    }
    if has_paid {
        return Intent::TogglePaid;
    }
    if has_list && has_income {
        return Intent::ListIncome;
    }
    if has_list && has_expense {
        return Intent::ListExpense;
    }
    if has_list {
        // Bare "listar" defaults to expenses.
        return Intent::ListExpense;
    }
    if has_income {
        return Intent::AddIncome;
    }
    if has_expense || has_add {
        return Intent::AddExpense;
    }
    // A lone number usually means the user wants to record something.
    if extract_value(text).is_some() {
        return Intent::AddExpense;
    }
    Intent::Unrecognized
}
