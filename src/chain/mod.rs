pub mod constants;
pub mod endpoints;
pub mod helius;
pub mod meteora_api;
pub mod provider;
pub mod rpc;
pub mod types;

pub use constants::METEORA_DLMM_PROGRAM_ID;
pub use endpoints::{EndpointLease, EndpointRotator};
pub use helius::HeliusClient;
pub use meteora_api::MeteoraApiClient;
pub use provider::EndpointClients;
pub use rpc::SolanaHistoryClient;
pub use types::{
    AssetIndex, ChainHistory, DasAsset, DasCreator, FeeSource, ProgramInstruction,
    SignatureEntry, SourceProvider, Sources, TransactionSummary, UserId, CLI_USER,
};
