#![doc = "Binary for building schema definitions from the staked option contracts."]
#[allow(unused_imports)]
use staked_option;

#[cfg(not(target_arch = "wasm32"))]
extern "Rust" {
    fn module_schema() -> odra::contract_def::ContractBlueprint;
    fn casper_contract_schema() -> odra::schema::casper_contract_schema::ContractSchema;
}

fn main() {
    // Schema for the contract selected by ODRA_MODULE at build time
    odra_build::schema(unsafe { crate::module_schema() }, unsafe {
        crate::casper_contract_schema()
    });
}
