use once_cell::sync::Lazy;
use regex::Regex;

static PADRAO_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("padrão de e-mail inválido")
});

/// Valida CPF (11 dígitos) ou CNPJ (14 dígitos) pelos dígitos
/// verificadores. Caracteres de formatação são ignorados; qualquer outro
/// comprimento é inválido. Nunca falha, só retorna false.
pub fn validar_cpf_cnpj(documento: &str) -> bool {
    let digitos: Vec<u32> = documento.chars().filter_map(|c| c.to_digit(10)).collect();

    match digitos.len() {
        11 => validar_cpf(&digitos),
        14 => validar_cnpj(&digitos),
        _ => false,
    }
}

// 0 quando o resto é 0 ou 1, senão o complemento de 11
fn digito_verificador(soma: u32) -> u32 {
    let resto = soma % 11;
    if resto < 2 {
        0
    } else {
        11 - resto
    }
}

fn validar_cpf(digitos: &[u32]) -> bool {
    let soma1: u32 = (0..9).map(|i| digitos[i] * (10 - i as u32)).sum();
    let digito1 = digito_verificador(soma1);

    let soma2: u32 = (0..10).map(|i| digitos[i] * (11 - i as u32)).sum();
    let digito2 = digito_verificador(soma2);

    digitos[9] == digito1 && digitos[10] == digito2
}

const PESOS_CNPJ_1: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const PESOS_CNPJ_2: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

fn validar_cnpj(digitos: &[u32]) -> bool {
    let soma1: u32 = PESOS_CNPJ_1
        .iter()
        .zip(&digitos[..12])
        .map(|(peso, digito)| peso * digito)
        .sum();
    let digito1 = digito_verificador(soma1);

    let soma2: u32 = PESOS_CNPJ_2
        .iter()
        .zip(&digitos[..13])
        .map(|(peso, digito)| peso * digito)
        .sum();
    let digito2 = digito_verificador(soma2);

    digitos[12] == digito1 && digitos[13] == digito2
}

/// Padrão fixo usuario@dominio.tld; o TLD precisa ter ao menos duas
/// letras, então "a@b" não passa.
pub fn validar_email(email: &str) -> bool {
    PADRAO_EMAIL.is_match(email)
}
