use std::path::PathBuf;

use anyhow::bail;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gest_assinaturas::clientes::cliente::{
    find_all_clientes, find_cliente_by_id, limpar_aviso, pesquisar_clientes,
    recalcular_status_global, registrar_aviso, remove_cliente_from_db, save_cliente_to_db,
    update_cliente_in_db,
};
use gest_assinaturas::clientes::cliente_model::{Cliente, ClienteDto, CriterioPesquisa};
use gest_assinaturas::clientes::importacao::importar_csv;
use gest_assinaturas::clientes::renovacao::renovar_assinatura;
use gest_assinaturas::config::Config;
use gest_assinaturas::db;
use gest_assinaturas::relatorios;
use gest_assinaturas::utils::comprovantes::anexar_comprovante;
use gest_assinaturas::utils::status::{calcular_status_em, calcular_vencimento};
use gest_assinaturas::utils::validators::{validar_cpf_cnpj, validar_email};

#[derive(Parser)]
#[command(name = "gest-assinaturas", about = "Gestão de clientes e assinaturas", version)]
struct Cli {
    #[command(subcommand)]
    comando: Comando,
}

#[derive(Subcommand)]
enum Comando {
    /// Cadastra um novo cliente
    Adicionar(DadosCliente),
    /// Lista todos os clientes
    Listar,
    /// Atualiza o cadastro completo de um cliente
    Editar {
        id: i64,
        #[command(flatten)]
        dados: DadosCliente,
    },
    /// Remove um cliente; o comprovante em disco fica para trás
    Remover { id: i64 },
    /// Pesquisa por critério: Nome, Telefone, CPF/CNPJ, E-mail, Vencimento,
    /// Status ou Estado
    Pesquisar {
        criterio: String,
        valores: Vec<String>,
    },
    /// Renova a assinatura: novo período e pagamento, vencimento derivado
    Renovar {
        id: i64,
        #[arg(long)]
        periodo: i64,
        #[arg(long)]
        pagamento: NaiveDate,
        #[arg(long)]
        comprovante: Option<PathBuf>,
    },
    /// Registra o aviso de cobrança de hoje (ou limpa com --limpar)
    Avisar {
        id: i64,
        #[arg(long)]
        limpar: bool,
    },
    /// Recalcula o status de todos os clientes
    Recalcular,
    /// Importa clientes de um arquivo CSV
    Importar { arquivo: PathBuf },
    /// Contagem de clientes por agrupamento
    Relatorio {
        #[arg(value_parser = ["estado", "cidade", "status"])]
        agrupamento: String,
    },
    /// Mostra o caminho do comprovante de um cliente
    Comprovante { id: i64 },
}

#[derive(Args)]
struct DadosCliente {
    #[arg(long)]
    nome: String,
    #[arg(long, default_value = "")]
    telefone: String,
    #[arg(long, default_value = "")]
    cpf_cnpj: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value_t = 1)]
    periodo: i64,
    /// Data do último pagamento (AAAA-MM-DD)
    #[arg(long)]
    pagamento: NaiveDate,
    #[arg(long, default_value = "")]
    estado: String,
    #[arg(long, default_value = "")]
    cidade: String,
    #[arg(long, default_value = "")]
    observacao: String,
    #[arg(long)]
    comprovante: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let mut conn = db::abrir_conexao(config.db_path())?;
    let hoje = Local::now().date_naive();

    match cli.comando {
        Comando::Adicionar(dados) => {
            validar_entrada(&dados)?;

            let comprovante = match &dados.comprovante {
                Some(origem) => Some(anexar_comprovante(&config, &dados.nome, origem)?),
                None => None,
            };

            let vencimento = calcular_vencimento(dados.pagamento, dados.periodo);
            let dto = ClienteDto {
                nome: dados.nome,
                telefone: dados.telefone,
                cpf_cnpj: dados.cpf_cnpj,
                email: dados.email,
                periodo_assinatura: dados.periodo,
                ultimo_pagamento: dados.pagamento,
                vencimento,
                data_aviso: None,
                avisado: false,
                status: calcular_status_em(vencimento, hoje),
                estado: dados.estado,
                cidade: dados.cidade,
                observacao: dados.observacao,
                comprovante,
            };

            let id = save_cliente_to_db(&conn, &dto)?;
            println!(
                "Cliente {} cadastrado, vencimento em {}",
                id,
                vencimento.format("%d/%m/%Y")
            );
        }

        Comando::Listar => {
            imprimir_clientes(&find_all_clientes(&conn)?);
        }

        Comando::Editar { id, dados } => {
            validar_entrada(&dados)?;
            let Some(atual) = find_cliente_by_id(&conn, id) else {
                bail!("Cliente {} não encontrado", id);
            };

            let comprovante = match &dados.comprovante {
                Some(origem) => Some(anexar_comprovante(&config, &dados.nome, origem)?),
                None => atual.comprovante,
            };

            let vencimento = calcular_vencimento(dados.pagamento, dados.periodo);
            let cliente = Cliente {
                id,
                nome: dados.nome,
                telefone: dados.telefone,
                cpf_cnpj: dados.cpf_cnpj,
                email: dados.email,
                periodo_assinatura: dados.periodo,
                ultimo_pagamento: dados.pagamento,
                vencimento,
                data_aviso: atual.data_aviso,
                avisado: atual.avisado,
                status: calcular_status_em(vencimento, hoje),
                estado: dados.estado,
                cidade: dados.cidade,
                observacao: dados.observacao,
                comprovante,
            };

            update_cliente_in_db(&mut conn, &cliente)?;
            println!("Cliente {} atualizado", id);
        }

        Comando::Remover { id } => {
            remove_cliente_from_db(&conn, id)?;
            println!("Cliente {} removido", id);
        }

        Comando::Pesquisar { criterio, valores } => {
            // Critério desconhecido é resultado vazio, não erro
            let clientes = match CriterioPesquisa::parse(&criterio) {
                Some(criterio) => pesquisar_clientes(&conn, criterio, &valores),
                None => Vec::new(),
            };
            imprimir_clientes(&clientes);
        }

        Comando::Renovar {
            id,
            periodo,
            pagamento,
            comprovante,
        } => {
            let renovado = renovar_assinatura(
                &mut conn,
                &config,
                id,
                periodo,
                pagamento,
                hoje,
                comprovante.as_deref(),
            )?;
            println!(
                "Assinatura renovada, novo vencimento em {} ({})",
                renovado.vencimento.format("%d/%m/%Y"),
                renovado.status
            );
        }

        Comando::Avisar { id, limpar } => {
            if find_cliente_by_id(&conn, id).is_none() {
                bail!("Cliente {} não encontrado", id);
            }
            if limpar {
                limpar_aviso(&conn, id)?;
                println!("Aviso do cliente {} limpo", id);
            } else {
                registrar_aviso(&conn, id, hoje)?;
                println!("Aviso registrado para o cliente {}", id);
            }
        }

        Comando::Recalcular => {
            let resumo = recalcular_status_global(&conn, hoje)?;
            println!(
                "{} clientes atualizados, {} com data de vencimento inválida",
                resumo.atualizados, resumo.datas_invalidas
            );
        }

        Comando::Importar { arquivo } => {
            let resumo = importar_csv(&conn, &arquivo)?;
            println!(
                "{} registros importados, {} com falha",
                resumo.importados, resumo.falhas
            );
        }

        Comando::Relatorio { agrupamento } => {
            let contagens = match agrupamento.as_str() {
                "estado" => relatorios::contar_por_estado(&conn)?,
                "cidade" => relatorios::contar_por_cidade(&conn)?,
                _ => relatorios::contar_por_status(&conn)?,
            };
            for (grupo, total) in contagens {
                println!("{grupo}: {total}");
            }
        }

        Comando::Comprovante { id } => {
            let Some(cliente) = find_cliente_by_id(&conn, id) else {
                bail!("Cliente {} não encontrado", id);
            };
            match cliente.comprovante {
                Some(nome) => {
                    let caminho = config.caminho_comprovante(&nome);
                    if caminho.exists() {
                        println!("{}", caminho.display());
                    } else {
                        println!("Arquivo do comprovante não encontrado: {}", caminho.display());
                    }
                }
                None => println!("Nenhum comprovante encontrado para este cliente"),
            }
        }
    }

    Ok(())
}

// As mesmas regras que o formulário original aplicava antes de salvar
fn validar_entrada(dados: &DadosCliente) -> anyhow::Result<()> {
    if dados.nome.trim().is_empty() {
        bail!("Nome é obrigatório");
    }
    if !dados.telefone.is_empty() {
        let digitos = dados.telefone.chars().filter(|c| c.is_ascii_digit()).count();
        if digitos != 11 {
            bail!("O telefone deve ter exatamente 11 dígitos");
        }
    }
    if !dados.cpf_cnpj.is_empty() && !validar_cpf_cnpj(&dados.cpf_cnpj) {
        bail!("CPF/CNPJ inválido");
    }
    if !dados.email.is_empty() && !validar_email(&dados.email) {
        bail!("E-mail inválido");
    }
    Ok(())
}

fn imprimir_clientes(clientes: &[Cliente]) {
    if clientes.is_empty() {
        println!("Nenhum cliente encontrado");
        return;
    }

    for c in clientes {
        println!(
            "{:>4}  {:<30}  {:<15}  venc. {}  {:<12}  {}/{}",
            c.id,
            c.nome,
            c.telefone,
            c.vencimento.format("%d/%m/%Y"),
            c.status.as_str(),
            c.cidade,
            c.estado
        );
    }
    println!("{} cliente(s)", clientes.len());
}
