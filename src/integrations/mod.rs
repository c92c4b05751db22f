pub mod multiversx;

pub use multiversx::{
    AccountOnNetwork, ContractQuery, ContractQueryResponse, MultiversxApiClient, NetworkProvider,
};
