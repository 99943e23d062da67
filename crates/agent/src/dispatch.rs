use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use finbot_core::{
    default_date, ExpenseDraft, GoalDraft, IncomeDraft, Ledger, LedgerError, Money, RecordKind,
};

use crate::extract::{extract_description, extract_entities, extract_record_id, extract_value};
use crate::intent::{classify, Intent};

/// Side-effect notification emitted by a successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Action {
    RecordAdded { kind: RecordKind, id: i64 },
    RecordUpdated { kind: RecordKind, id: i64 },
    RecordDeleted { kind: RecordKind, id: i64 },
    GoalAdded { id: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub reply: String,
    pub actions: Vec<Action>,
}

impl CommandResult {
    fn reply_only(reply: impl Into<String>) -> Self {
        CommandResult {
            reply: reply.into(),
            actions: Vec::new(),
        }
    }
}

fn fmt_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Processes one chat message: classify, extract, dispatch. Each intent
/// branch is terminal; at most one persistence mutation happens per call.
/// The history argument is accepted for interface parity and ignored.
pub async fn handle_message<L: Ledger>(
    message: &str,
    _history: &[String],
    ledger: &L,
) -> Result<CommandResult, LedgerError> {
    let today = default_date();

    match classify(message) {
        Intent::Help => Ok(CommandResult::reply_only(
            "👋 Olá! Eu sou o **FinBot**, seu assistente financeiro!\n\n\
             Aqui está o que eu posso fazer por você:\n\n\
             💰 **Adicionar receita** — Ex: *\"receita salário 3500\"*\n\
             💸 **Adicionar despesa** — Ex: *\"despesa aluguel 1200\"*\n\
             📋 **Listar despesas** — Ex: *\"listar despesas\"*\n\
             📋 **Listar receitas** — Ex: *\"listar receitas\"*\n\
             📊 **Ver resumo** — Ex: *\"resumo\"* ou *\"saldo\"*\n\
             ✅ **Marcar paga** — Ex: *\"pagar despesa 5\"*\n\
             🗑️ **Deletar** — Ex: *\"deletar despesa 3\"*\n\
             🎯 **Metas** — Ex: *\"adicionar meta viagem 5000\"*\n\n\
             Pode me dizer o que precisa! 😊",
        )),

        Intent::AddIncome => {
            let entities = extract_entities(message, RecordKind::Income);
            let Some(value) = entities.value else {
                return Ok(CommandResult::reply_only(
                    "💰 Qual o valor da receita? Ex: *\"receita salário 3500\"*",
                ));
            };
            let draft = IncomeDraft {
                description: entities.description,
                category: entities.category,
                value,
                date: entities.date.unwrap_or(today),
                notes: None,
            };
            let income = ledger.add_income(draft).await?;
            Ok(CommandResult {
                reply: format!(
                    "✅ Receita adicionada com sucesso!\n\n\
                     📝 **{}**\n📂 Categoria: {}\n💰 Valor: {}\n📅 Data: {}",
                    income.description,
                    income.category,
                    income.value,
                    fmt_date(income.date),
                ),
                actions: vec![Action::RecordAdded {
                    kind: RecordKind::Income,
                    id: income.id,
                }],
            })
        }

        Intent::AddExpense => {
            let entities = extract_entities(message, RecordKind::Expense);
            let Some(value) = entities.value else {
                return Ok(CommandResult::reply_only(
                    "💸 Qual o valor da despesa? Ex: *\"despesa luz 150\"*",
                ));
            };
            let draft = ExpenseDraft::simple(
                entities.description,
                entities.category,
                value,
                entities.date.unwrap_or(today),
            );
            let expense = ledger.add_expense(draft).await?;
            Ok(CommandResult {
                reply: format!(
                    "✅ Despesa adicionada com sucesso!\n\n\
                     📝 **{}**\n📂 Categoria: {}\n💸 Valor: {}\n📅 Vencimento: {}\n⏳ Status: Pendente",
                    expense.description,
                    expense.category,
                    expense.value,
                    fmt_date(expense.due_date),
                ),
                actions: vec![Action::RecordAdded {
                    kind: RecordKind::Expense,
                    id: expense.id,
                }],
            })
        }

        Intent::AddGoal => {
            let Some(target) = extract_value(message) else {
                return Ok(CommandResult::reply_only(
                    "🎯 Qual o valor da meta? Ex: *\"meta viagem 5000\"*",
                ));
            };
            let draft = GoalDraft {
                description: extract_description(message, "meta"),
                target,
                deadline: None,
            };
            let goal = ledger.add_goal(draft).await?;
            Ok(CommandResult {
                reply: format!(
                    "🎯 Meta criada com sucesso!\n\n📝 **{}**\n💰 Valor alvo: {}\n📊 Progresso: 0%",
                    goal.description, goal.target,
                ),
                actions: vec![Action::GoalAdded { id: goal.id }],
            })
        }

        Intent::ListExpense => {
            let expenses = ledger
                .expenses_in_month(today.year(), today.month(), None)
                .await?;
            if expenses.is_empty() {
                return Ok(CommandResult::reply_only(
                    "📋 Nenhuma despesa encontrada neste mês.",
                ));
            }
            let total = expenses
                .iter()
                .fold(Money::zero(), |acc, e| acc + e.value);
            let mut lines = vec![format!("📋 **Despesas de {}:**\n", today.format("%m/%Y"))];
            for e in &expenses {
                let status = if e.paid { "✅" } else { "⏳" };
                lines.push(format!(
                    "{status} **#{}** {} — {} ({})",
                    e.id, e.description, e.value, e.category
                ));
            }
            lines.push(format!("\n💰 **Total: {total}**"));
            Ok(CommandResult::reply_only(lines.join("\n")))
        }

        Intent::ListIncome => {
            let incomes = ledger
                .incomes_in_month(today.year(), today.month(), None)
                .await?;
            if incomes.is_empty() {
                return Ok(CommandResult::reply_only(
                    "📋 Nenhuma receita encontrada neste mês.",
                ));
            }
            let total = incomes.iter().fold(Money::zero(), |acc, i| acc + i.value);
            let mut lines = vec![format!("📋 **Receitas de {}:**\n", today.format("%m/%Y"))];
            for i in &incomes {
                lines.push(format!(
                    "💰 **#{}** {} — {} ({})",
                    i.id, i.description, i.value, i.category
                ));
            }
            lines.push(format!("\n💰 **Total: {total}**"));
            Ok(CommandResult::reply_only(lines.join("\n")))
        }

        Intent::ListGoals => {
            let goals = ledger.goals().await?;
            if goals.is_empty() {
                return Ok(CommandResult::reply_only("🎯 Nenhuma meta cadastrada."));
            }
            let mut lines = vec!["🎯 **Suas metas:**\n".to_string()];
            for g in &goals {
                let status = if g.completed {
                    "✅".to_string()
                } else {
                    format!("{:.0}%", g.progress_pct())
                };
                lines.push(format!(
                    "**#{}** {} — {}/{} ({status})",
                    g.id, g.description, g.saved, g.target
                ));
            }
            Ok(CommandResult::reply_only(lines.join("\n")))
        }

        Intent::Summary => {
            let incomes = ledger
                .incomes_in_month(today.year(), today.month(), None)
                .await?;
            let expenses = ledger
                .expenses_in_month(today.year(), today.month(), None)
                .await?;
            let total_income = incomes.iter().fold(Money::zero(), |acc, i| acc + i.value);
            let total_expense = expenses
                .iter()
                .fold(Money::zero(), |acc, e| acc + e.value);
            let paid = expenses
                .iter()
                .filter(|e| e.paid)
                .fold(Money::zero(), |acc, e| acc + e.value);
            let pending = total_expense - paid;
            let balance = total_income - total_expense;
            let balance_emoji = if balance.is_positive() || balance.is_zero() {
                "🟢"
            } else {
                "🔴"
            };
            Ok(CommandResult::reply_only(format!(
                "📊 **Resumo de {}:**\n\n\
                 💰 Receitas: {total_income}\n💸 Despesas: {total_expense}\n\
                 ✅ Pagas: {paid}\n⏳ Pendentes: {pending}\n\
                 {balance_emoji} **Saldo: {balance}**",
                today.format("%m/%Y"),
            )))
        }

        Intent::TogglePaid => {
            let Some(id) = extract_record_id(message) else {
                return Ok(CommandResult::reply_only(
                    "🔢 Qual o ID da despesa? Ex: *\"pagar despesa 5\"*",
                ));
            };
            match ledger.toggle_expense_paid(id, today).await? {
                None => Ok(CommandResult::reply_only(format!(
                    "❌ Despesa #{id} não encontrada."
                ))),
                Some(expense) => {
                    let (emoji, status) = if expense.paid {
                        ("✅", "paga ✅")
                    } else {
                        ("⏳", "pendente ⏳")
                    };
                    Ok(CommandResult {
                        reply: format!(
                            "{emoji} Despesa **#{} — {}** marcada como **{status}**!",
                            expense.id, expense.description
                        ),
                        actions: vec![Action::RecordUpdated {
                            kind: RecordKind::Expense,
                            id: expense.id,
                        }],
                    })
                }
            }
        }

        Intent::DeleteExpense => {
            let Some(id) = extract_record_id(message) else {
                return Ok(CommandResult::reply_only(
                    "🔢 Qual o ID da despesa? Ex: *\"deletar despesa 3\"*",
                ));
            };
            match ledger.delete_expense(id).await? {
                None => Ok(CommandResult::reply_only(format!(
                    "❌ Despesa #{id} não encontrada."
                ))),
                Some(expense) => Ok(CommandResult {
                    reply: format!(
                        "🗑️ Despesa **#{id} — {}** removida com sucesso!",
                        expense.description
                    ),
                    actions: vec![Action::RecordDeleted {
                        kind: RecordKind::Expense,
                        id,
                    }],
                }),
            }
        }

        Intent::DeleteIncome => {
            let Some(id) = extract_record_id(message) else {
                return Ok(CommandResult::reply_only(
                    "🔢 Qual o ID da receita? Ex: *\"deletar receita 2\"*",
                ));
            };
            match ledger.delete_income(id).await? {
                None => Ok(CommandResult::reply_only(format!(
                    "❌ Receita #{id} não encontrada."
                ))),
                Some(income) => Ok(CommandResult {
                    reply: format!(
                        "🗑️ Receita **#{id} — {}** removida com sucesso!",
                        income.description
                    ),
                    actions: vec![Action::RecordDeleted {
                        kind: RecordKind::Income,
                        id,
                    }],
                }),
            }
        }

        Intent::Unrecognized => Ok(CommandResult::reply_only(
            "🤔 Não entendi o que você quer fazer. Tente algo como:\n\n\
             💰 *\"receita salário 3500\"*\n\
             💸 *\"despesa aluguel 1200\"*\n\
             📋 *\"listar despesas\"*\n\
             📊 *\"resumo\"*\n\
             📎 Ou **anexe uma planilha** Excel para importar despesas/receitas!\n\
             ❓ *\"ajuda\"* — para ver todos os comandos",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finbot_core::{Expense, Goal, Income};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryLedger {
        inner: Mutex<Inner>,
    }

    #[derive(Default)]
    struct Inner {
        incomes: Vec<Income>,
        expenses: Vec<Expense>,
        goals: Vec<Goal>,
        next_id: i64,
    }

    impl Inner {
        fn alloc(&mut self) -> i64 {
            self.next_id += 1;
            self.next_id
        }
    }

    impl Ledger for MemoryLedger {
        async fn add_income(&self, draft: IncomeDraft) -> Result<Income, LedgerError> {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.alloc();
            let income = Income {
                id,
                description: draft.description,
                category: draft.category,
                value: draft.value,
                date: draft.date,
                notes: draft.notes,
            };
            inner.incomes.push(income.clone());
            Ok(income)
        }

        async fn add_expense(&self, draft: ExpenseDraft) -> Result<Expense, LedgerError> {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.alloc();
            let expense = Expense {
                id,
                description: draft.description,
                category: draft.category,
                value: draft.value,
                due_date: draft.due_date,
                paid: draft.paid,
                paid_date: draft.paid_date,
                installment_current: draft.installment_current,
                installment_total: draft.installment_total,
                notes: draft.notes,
            };
            inner.expenses.push(expense.clone());
            Ok(expense)
        }

        async fn add_goal(&self, draft: GoalDraft) -> Result<Goal, LedgerError> {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.alloc();
            let goal = Goal {
                id,
                description: draft.description,
                target: draft.target,
                saved: Money::zero(),
                completed: false,
                deadline: draft.deadline,
            };
            inner.goals.push(goal.clone());
            Ok(goal)
        }

        async fn incomes_in_month(
            &self,
            year: i32,
            month: u32,
            category: Option<&str>,
        ) -> Result<Vec<Income>, LedgerError> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .incomes
                .iter()
                .filter(|i| i.date.year() == year && i.date.month() == month)
                .filter(|i| category.map_or(true, |c| i.category == c))
                .cloned()
                .collect())
        }

        async fn expenses_in_month(
            &self,
            year: i32,
            month: u32,
            category: Option<&str>,
        ) -> Result<Vec<Expense>, LedgerError> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .expenses
                .iter()
                .filter(|e| e.due_date.year() == year && e.due_date.month() == month)
                .filter(|e| category.map_or(true, |c| e.category == c))
                .cloned()
                .collect())
        }

        async fn goals(&self) -> Result<Vec<Goal>, LedgerError> {
            Ok(self.inner.lock().unwrap().goals.clone())
        }

        async fn delete_income(&self, id: i64) -> Result<Option<Income>, LedgerError> {
            let mut inner = self.inner.lock().unwrap();
            let pos = inner.incomes.iter().position(|i| i.id == id);
            Ok(pos.map(|p| inner.incomes.remove(p)))
        }

        async fn delete_expense(&self, id: i64) -> Result<Option<Expense>, LedgerError> {
            let mut inner = self.inner.lock().unwrap();
            let pos = inner.expenses.iter().position(|e| e.id == id);
            Ok(pos.map(|p| inner.expenses.remove(p)))
        }

        async fn toggle_expense_paid(
            &self,
            id: i64,
            paid_on: NaiveDate,
        ) -> Result<Option<Expense>, LedgerError> {
            let mut inner = self.inner.lock().unwrap();
            let Some(expense) = inner.expenses.iter_mut().find(|e| e.id == id) else {
                return Ok(None);
            };
            expense.paid = !expense.paid;
            expense.paid_date = expense.paid.then_some(paid_on);
            Ok(Some(expense.clone()))
        }
    }

    async fn send(ledger: &MemoryLedger, message: &str) -> CommandResult {
        handle_message(message, &[], ledger).await.unwrap()
    }

    #[tokio::test]
    async fn add_expense_persists_and_confirms() {
        let ledger = MemoryLedger::default();
        let result = send(&ledger, "despesa aluguel 1200").await;

        assert_eq!(
            result.actions,
            vec![Action::RecordAdded {
                kind: RecordKind::Expense,
                id: 1
            }]
        );
        assert!(result.reply.contains("R$ 1.200,00"));
        assert!(result.reply.contains("Aluguel"));

        let inner = ledger.inner.lock().unwrap();
        assert_eq!(inner.expenses.len(), 1);
        assert_eq!(inner.expenses[0].category, "Aluguel");
        assert!(!inner.expenses[0].paid);
    }

    #[tokio::test]
    async fn add_income_without_value_asks_for_it() {
        let ledger = MemoryLedger::default();
        let result = send(&ledger, "adicionar receita").await;

        assert!(result.actions.is_empty());
        assert!(result.reply.contains("Qual o valor"));
        assert!(result.reply.contains("receita salário 3500"));
        assert!(ledger.inner.lock().unwrap().incomes.is_empty());
    }

    #[tokio::test]
    async fn add_income_with_brazilian_value() {
        let ledger = MemoryLedger::default();
        let result = send(&ledger, "receita salário R$ 3.500,00").await;

        assert_eq!(
            result.actions,
            vec![Action::RecordAdded {
                kind: RecordKind::Income,
                id: 1
            }]
        );
        assert!(result.reply.contains("R$ 3.500,00"));
        let inner = ledger.inner.lock().unwrap();
        assert_eq!(inner.incomes[0].category, "Salário");
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found_reply() {
        let ledger = MemoryLedger::default();
        let result = send(&ledger, "deletar despesa 99").await;

        assert!(result.actions.is_empty());
        assert!(result.reply.contains("#99"));
        assert!(result.reply.contains("não encontrada"));
    }

    #[tokio::test]
    async fn delete_existing_expense() {
        let ledger = MemoryLedger::default();
        send(&ledger, "despesa luz 150").await;
        let result = send(&ledger, "deletar despesa 1").await;

        assert_eq!(
            result.actions,
            vec![Action::RecordDeleted {
                kind: RecordKind::Expense,
                id: 1
            }]
        );
        assert!(ledger.inner.lock().unwrap().expenses.is_empty());
    }

    #[tokio::test]
    async fn toggle_paid_flips_and_records_date() {
        let ledger = MemoryLedger::default();
        send(&ledger, "despesa internet 99,90").await;

        let result = send(&ledger, "pagar despesa 1").await;
        assert_eq!(
            result.actions,
            vec![Action::RecordUpdated {
                kind: RecordKind::Expense,
                id: 1
            }]
        );
        assert!(result.reply.contains("paga"));
        {
            let inner = ledger.inner.lock().unwrap();
            assert!(inner.expenses[0].paid);
            assert!(inner.expenses[0].paid_date.is_some());
        }

        // Toggling again goes back to pending and clears the date.
        let result = send(&ledger, "pagar despesa 1").await;
        assert!(result.reply.contains("pendente"));
        let inner = ledger.inner.lock().unwrap();
        assert!(!inner.expenses[0].paid);
        assert!(inner.expenses[0].paid_date.is_none());
    }

    #[tokio::test]
    async fn toggle_paid_without_id_asks_for_it() {
        let ledger = MemoryLedger::default();
        let result = send(&ledger, "quitar").await;

        assert!(result.actions.is_empty());
        assert!(result.reply.contains("Qual o ID"));
    }

    #[tokio::test]
    async fn list_expenses_of_current_month() {
        let ledger = MemoryLedger::default();
        send(&ledger, "despesa aluguel 1200").await;
        send(&ledger, "despesa mercado 350").await;

        let result = send(&ledger, "listar despesas").await;
        assert!(result.actions.is_empty());
        assert!(result.reply.contains("**#1**"));
        assert!(result.reply.contains("**#2**"));
        assert!(result.reply.contains("Total: R$ 1.550,00"));
    }

    #[tokio::test]
    async fn list_empty_month() {
        let ledger = MemoryLedger::default();
        let result = send(&ledger, "listar despesas").await;
        assert_eq!(result.reply, "📋 Nenhuma despesa encontrada neste mês.");
    }

    #[tokio::test]
    async fn summary_balances_income_against_expense() {
        let ledger = MemoryLedger::default();
        send(&ledger, "receita salário 3000").await;
        send(&ledger, "despesa aluguel 1200").await;

        let result = send(&ledger, "resumo").await;
        assert!(result.actions.is_empty());
        assert!(result.reply.contains("Receitas: R$ 3.000,00"));
        assert!(result.reply.contains("Despesas: R$ 1.200,00"));
        assert!(result.reply.contains("Saldo: R$ 1.800,00"));
        assert!(result.reply.contains("🟢"));
    }

    #[tokio::test]
    async fn goal_round_trip() {
        let ledger = MemoryLedger::default();
        let result = send(&ledger, "meta viagem 5000").await;
        assert_eq!(result.actions, vec![Action::GoalAdded { id: 1 }]);
        assert!(result.reply.contains("R$ 5.000,00"));

        let result = send(&ledger, "listar metas").await;
        assert!(result.reply.contains("Meta viagem"));
        assert!(result.reply.contains("(0%)"));
    }

    #[tokio::test]
    async fn unrecognized_message_offers_examples() {
        let ledger = MemoryLedger::default();
        let result = send(&ledger, "xyz").await;
        assert!(result.actions.is_empty());
        assert!(result.reply.contains("Não entendi"));
        assert!(result.reply.contains("ajuda"));
    }

    #[test]
    fn action_wire_format() {
        let action = Action::RecordAdded {
            kind: RecordKind::Expense,
            id: 7,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "record_added", "data": {"kind": "expense", "id": 7}})
        );
    }

    #[tokio::test]
    async fn history_is_ignored() {
        let ledger = MemoryLedger::default();
        let history = vec!["mensagem antiga".to_string()];
        let result = handle_message("resumo", &history, &ledger).await.unwrap();
        assert!(result.reply.contains("Resumo"));
    }
}
