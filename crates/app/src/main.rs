use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use finbot_agent::handle_message;
use finbot_import::{decode, import_grid};
use finbot_storage::SqliteLedger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let project_dirs = directories::ProjectDirs::from("com", "finbot", "FinBot")
        .context("failed to resolve app directory")?;
    let data_dir = project_dirs.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir).context("failed to create data directory")?;

    let db_path = data_dir.join("finbot.db");
    let pool = finbot_storage::create_db(&db_path)
        .await
        .context("failed to open database")?;
    let ledger = SqliteLedger::new(pool);
    tracing::info!("ledger aberto em {}", db_path.display());

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(
            "💬 FinBot — digite um comando, \"/importar <arquivo>\" para planilhas, \"/sair\" para encerrar.\n"
                .as_bytes(),
        )
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/sair" {
            break;
        }

        let reply = if let Some(path) = line.strip_prefix("/importar ") {
            import_file(path.trim(), &ledger).await
        } else {
            match handle_message(line, &[], &ledger).await {
                Ok(result) => result.reply,
                Err(e) => {
                    tracing::error!("falha no ledger: {e}");
                    format!("❌ Erro ao acessar o banco: {e}")
                }
            }
        };

        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }

    Ok(())
}

/// Decodes a local spreadsheet and runs the sectioned import against the
/// ledger. Every failure comes back as a chat-style reply.
async fn import_file(path: &str, ledger: &SqliteLedger) -> String {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return format!("❌ Erro ao ler o arquivo: {e}"),
    };
    let grid = match decode(&bytes, path) {
        Ok(grid) => grid,
        Err(e) => return format!("❌ Erro ao ler o arquivo: {e}"),
    };
    match import_grid(&grid, ledger).await {
        Ok(outcome) => {
            tracing::info!(
                receitas = outcome.income_count,
                despesas = outcome.expense_count,
                erros = outcome.row_errors.len(),
                "importação concluída"
            );
            outcome.summary_reply()
        }
        Err(e) => format!("❌ {e}"),
    }
}
