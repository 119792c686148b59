pub mod cliente;
pub mod cliente_model;
pub mod importacao;
pub mod renovacao;
