/// Application constants

// Chain (Monad testnet)
pub const CHAIN_ID: u64 = 666;
pub const CHAIN_NAME: &str = "Monad Testnet";
pub const RPC_URL: &str = "https://testnet.monad.xyz";
pub const EXPLORER_URL: &str = "https://explorer.testnet.monad.xyz";
pub const NATIVE_SYMBOL: &str = "MON";
pub const NATIVE_DECIMALS: u32 = 18;

// Deployed FundMe contract
pub const CONTRACT_ADDRESS: &str = "0x529049b6680BF63105a74De5BA1440402c365325";
pub const CONTRACT_ABI: &[&str] = &[
    "function fund() payable",
    "function totalFunds() view returns (uint256)",
    "function funders(address) view returns (uint256)",
    "function getContractBalance() view returns (uint256)",
    "function getFunderCount() view returns (uint256)",
    "event Funded(address indexed funder, uint256 amount)",
];

// Contract function names
pub const FN_FUND: &str = "fund";
pub const FN_TOTAL_FUNDS: &str = "totalFunds";
pub const FN_FUNDERS: &str = "funders";
pub const FN_CONTRACT_BALANCE: &str = "getContractBalance";
pub const FN_FUNDER_COUNT: &str = "getFunderCount";

// Wallet
pub const WALLET_LINK_BASE: &str = "https://metamask.app.link";
pub const PAIRING_PROTOCOL_VERSION: u8 = 1;
pub const PAIRING_EXPIRY_SECS: i64 = 300; // 5 minutes
pub const CALLBACK_SCHEME: &str = "fundme";
pub const PAIRING_HOST: &str = "pair";

// Timing
pub const REFRESH_DELAY_SECS: u64 = 5;
pub const PAIRING_TIMEOUT_SECS: u64 = 120;

// Dapp metadata shown by the wallet during pairing
pub const DAPP_NAME: &str = "FundMe DApp";
pub const DAPP_URL: &str = "https://fundme.monad.xyz";
