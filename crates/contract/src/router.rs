//! String-argument entry points.
//!
//! The host calls [`invoke`] with a function name and positional string
//! arguments; this module checks arity, calls the matching
//! [`SupplyChainContract`] operation and shapes the [`Response`].

use supplychain_core::{ClientId, ContractError, ContractResult};
use supplychain_infra::TransactionContext;
use supplychain_products::ProductPatch;

use crate::config::ContractConfig;
use crate::contract::SupplyChainContract;
use crate::dto::{Response, to_payload};

pub const INIT_LEDGER: &str = "InitLedger";
pub const CREATE_PRODUCT: &str = "CreateProduct";
pub const UPDATE_PRODUCT: &str = "UpdateProduct";
pub const TRANSFER_OWNERSHIP: &str = "TransferOwnership";
pub const QUERY_PRODUCT: &str = "QueryProduct";
pub const PRODUCT_EXISTS: &str = "ProductExists";
pub const GET_ALL_PRODUCTS: &str = "GetAllProducts";

pub const FUNCTIONS: [&str; 7] = [
    INIT_LEDGER,
    CREATE_PRODUCT,
    UPDATE_PRODUCT,
    TRANSFER_OWNERSHIP,
    QUERY_PRODUCT,
    PRODUCT_EXISTS,
    GET_ALL_PRODUCTS,
];

/// Run one entry point inside a per-invocation span.
pub fn invoke<C: TransactionContext>(
    ctx: &C,
    config: &ContractConfig,
    function: &str,
    args: &[String],
) -> Response {
    let span = tracing::info_span!(
        "invoke",
        tx_id = %ctx.tx_id(),
        function,
        client = ctx.client_id().map(ClientId::as_str).unwrap_or("-"),
    );
    let _entered = span.enter();

    match dispatch(ctx, config, function, args) {
        Ok(payload) => {
            tracing::info!(payload_bytes = payload.len(), "invocation succeeded");
            Response::ok(payload)
        }
        Err(err) => {
            tracing::warn!(code = err.code(), error = %err, "invocation rejected");
            Response::error(&err)
        }
    }
}

/// Dispatch without the response wrapper; the payload is the success body.
pub fn dispatch<C: TransactionContext>(
    ctx: &C,
    config: &ContractConfig,
    function: &str,
    args: &[String],
) -> ContractResult<Vec<u8>> {
    let contract = SupplyChainContract::new(ctx, config);

    match function {
        INIT_LEDGER => {
            let [] = expect_args::<0>(function, args)?;
            contract.init_ledger()?;
            Ok(Vec::new())
        }
        CREATE_PRODUCT => {
            let [id, name, owner, description, category] = expect_args::<5>(function, args)?;
            contract.create_product(id, name, owner, description, category)?;
            Ok(Vec::new())
        }
        UPDATE_PRODUCT => {
            let [id, status, owner, description, category] = expect_args::<5>(function, args)?;
            let patch = ProductPatch::from_sparse_args(status, owner, description, category);
            contract.update_product(id, patch)?;
            Ok(Vec::new())
        }
        TRANSFER_OWNERSHIP => {
            let [id, new_owner] = expect_args::<2>(function, args)?;
            contract.transfer_ownership(id, new_owner)?;
            Ok(Vec::new())
        }
        QUERY_PRODUCT => {
            let [id] = expect_args::<1>(function, args)?;
            to_payload(&contract.query_product(id)?)
        }
        PRODUCT_EXISTS => {
            let [id] = expect_args::<1>(function, args)?;
            to_payload(&contract.product_exists(id)?)
        }
        GET_ALL_PRODUCTS => {
            let [] = expect_args::<0>(function, args)?;
            to_payload(&contract.get_all_products()?)
        }
        other => Err(ContractError::validation(format!(
            "unknown function '{other}'"
        ))),
    }
}

fn expect_args<'s, const N: usize>(
    function: &str,
    args: &'s [String],
) -> ContractResult<[&'s str; N]> {
    if args.len() != N {
        return Err(ContractError::validation(format!(
            "{function} expects {N} argument(s), got {}",
            args.len()
        )));
    }
    Ok(std::array::from_fn(|i| args[i].as_str()))
}
