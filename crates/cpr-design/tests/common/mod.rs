use std::sync::Arc;

use cpr_core::{Attribute, NamedEntity, Treatment, Unit, Value};
use cpr_design::{
    BlockReference, DesignBlock, ProductBlock, SubjectReference, SumBlock, SymbolTable,
    TreatmentReference,
};

pub const MICROMOLAR: &str = "http://purl.obolibrary.org/obo/UO_0000064";
pub const CELSIUS: &str = "http://purl.obolibrary.org/obo/UO_0000027";
pub const HOUR: &str = "http://purl.obolibrary.org/obo/UO_0000032";

pub fn micromolar(value: f64) -> Value {
    Value::new(value, Unit::new(MICROMOLAR))
}

pub fn nand_strain() -> NamedEntity {
    NamedEntity::new(
        "MG1655_NAND_Circuit",
        "https://hub.sd2e.org/user/sd2e/design/MG1655_NAND_Circuit/1",
    )
}

pub fn empty_strain() -> NamedEntity {
    NamedEntity::new(
        "MG1655_empty_landing_pads",
        "https://hub.sd2e.org/user/sd2e/design/MG1655_empty_landing_pads/1",
    )
}

pub fn reagent(name: &str) -> Treatment {
    Treatment::from_entity(NamedEntity::new(
        name,
        format!("https://hub.sd2e.org/user/sd2e/design/{name}/1"),
    ))
}

pub fn temperature() -> Treatment {
    Treatment::from_attribute(Attribute::unbound("temperature", Unit::new(CELSIUS)))
}

pub fn timepoint() -> Treatment {
    Treatment::from_attribute(Attribute::unbound("timepoint", Unit::new(HOUR)))
}

/// Entities and treatments used across the design tests; no designs yet.
pub fn base_symbols() -> SymbolTable {
    SymbolTable::from_parts(
        [nand_strain(), empty_strain()],
        [
            reagent("IPTG"),
            reagent("Kan"),
            reagent("L-arabinose"),
            temperature(),
            timepoint(),
        ],
    )
    .unwrap()
}

/// `base_symbols` plus the `strains` and `conditions` designs.
pub fn symbols_with_designs() -> (SymbolTable, Arc<DesignBlock>, Arc<DesignBlock>) {
    let mut symbols = base_symbols();
    let strains = symbols
        .insert_design(DesignBlock::new(
            "strains",
            SumBlock::new(vec![
                ProductBlock::new(vec![
                    SubjectReference::new(nand_strain()).into(),
                    TreatmentReference::create_from(reagent("Kan"), None).into(),
                ])
                .into(),
                SubjectReference::new(empty_strain()).into(),
            ]),
        ))
        .unwrap();
    let conditions = symbols
        .insert_design(DesignBlock::new(
            "conditions",
            TreatmentReference::create_from(reagent("IPTG"), Some(micromolar(0.25))),
        ))
        .unwrap();
    (symbols, strains, conditions)
}

pub fn reference(design: &Arc<DesignBlock>) -> BlockReference {
    BlockReference::new(Arc::clone(design))
}
