//! Recipe explosion engine
//!
//! Converts order-line quantities of (possibly manufactured) products into a
//! consolidated map of leaf-product quantities. Consolidation happens in a
//! single accumulator shared across all order lines and recursion branches:
//! two lines that bottom out at the same raw material contribute to one
//! combined quantity.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::catalog::{CatalogError, CatalogGraph};
use crate::models::{OrderLine, ProductType, StockWarning};

/// Consolidated leaf requirement for one order
#[derive(Debug, Clone, Default)]
pub struct ExplodedRequirement {
    /// Leaf product id -> total required quantity, across all order lines
    leaves: BTreeMap<Uuid, Decimal>,
    /// Portion of `leaves` that came from raw materials sold directly as
    /// order lines rather than through a recipe
    direct_raw: BTreeMap<Uuid, Decimal>,
    warnings: Vec<StockWarning>,
}

impl ExplodedRequirement {
    /// Full requirement per leaf product, including direct raw-material
    /// lines so availability checks still cover them
    pub fn requirement(&self) -> &BTreeMap<Uuid, Decimal> {
        &self.leaves
    }

    /// Quantities actually debited by a sale: the requirement minus the
    /// direct raw-material portions, which are tracked but never mutated
    /// through the sale path
    pub fn consumption_quantities(&self) -> BTreeMap<Uuid, Decimal> {
        let mut out = BTreeMap::new();
        for (&product_id, &quantity) in &self.leaves {
            let direct = self
                .direct_raw
                .get(&product_id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let consumed = quantity - direct;
            if consumed > Decimal::ZERO {
                out.insert(product_id, consumed);
            }
        }
        out
    }

    pub fn warnings(&self) -> &[StockWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

/// Walks the recipe graph, accumulating leaf quantities
pub struct RecipeExploder<'a> {
    graph: &'a CatalogGraph,
}

impl<'a> RecipeExploder<'a> {
    pub fn new(graph: &'a CatalogGraph) -> Self {
        Self { graph }
    }

    /// Explode a whole order into its consolidated leaf requirement
    ///
    /// Non-positive line quantities are a caller precondition; lines are
    /// expanded to arbitrary recipe depth. A cycle in the recipe graph is a
    /// fatal configuration error naming the offending path.
    pub fn explode(&self, lines: &[OrderLine]) -> Result<ExplodedRequirement, CatalogError> {
        let mut result = ExplodedRequirement::default();
        let mut path: Vec<Uuid> = Vec::new();

        for line in lines {
            let product = self.graph.product(line.product_id)?;

            if product.product_type == ProductType::RawMaterial {
                // Selling raw material directly is anomalous: track it for
                // validation, flag it, but it will not be debited as a sale
                *result.direct_raw.entry(product.id).or_insert(Decimal::ZERO) += line.quantity;
                result.warnings.push(StockWarning::DirectRawMaterialSale {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    quantity: line.quantity,
                });
            }

            self.expand(line.product_id, line.quantity, &mut path, &mut result.leaves)?;
        }

        Ok(result)
    }

    fn expand(
        &self,
        product_id: Uuid,
        quantity: Decimal,
        path: &mut Vec<Uuid>,
        accumulator: &mut BTreeMap<Uuid, Decimal>,
    ) -> Result<(), CatalogError> {
        let product = self.graph.product(product_id)?;

        if product.product_type.is_leaf() {
            *accumulator.entry(product_id).or_insert(Decimal::ZERO) += quantity;
            return Ok(());
        }

        if path.contains(&product_id) {
            let mut names: Vec<String> =
                path.iter().map(|id| self.graph.product_name(*id)).collect();
            names.push(product.name.clone());
            return Err(CatalogError::RecipeCycle(names.join(" -> ")));
        }

        path.push(product_id);
        for edge in self.graph.components_of(product_id) {
            self.expand(
                edge.component_product_id,
                quantity * edge.quantity_per_unit,
                path,
                accumulator,
            )?;
        }
        path.pop();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, ProductComponent};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn product(name: &str, product_type: ProductType) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            product_type,
            cost: Decimal::ONE,
            unit: "kg".to_string(),
            min_stock: Decimal::ZERO,
            avg_purchase_quantity: Decimal::ZERO,
        }
    }

    fn edge(parent: &Product, component: &Product, qty: &str) -> ProductComponent {
        ProductComponent {
            product_id: parent.id,
            component_product_id: component.id,
            quantity_per_unit: dec(qty),
        }
    }

    #[test]
    fn test_consolidation_across_lines() {
        // A = 3 flour + 2 sugar, B = 2 flour + 1 sugar
        // 1xA + 2xB => flour 7, sugar 4
        let flour = product("flour", ProductType::RawMaterial);
        let sugar = product("sugar", ProductType::RawMaterial);
        let a = product("cake A", ProductType::Manufactured);
        let b = product("cake B", ProductType::Manufactured);

        let graph = CatalogGraph::build(
            vec![flour.clone(), sugar.clone(), a.clone(), b.clone()],
            vec![
                edge(&a, &flour, "3"),
                edge(&a, &sugar, "2"),
                edge(&b, &flour, "2"),
                edge(&b, &sugar, "1"),
            ],
        )
        .unwrap();

        let result = RecipeExploder::new(&graph)
            .explode(&[
                OrderLine { product_id: a.id, quantity: dec("1") },
                OrderLine { product_id: b.id, quantity: dec("2") },
            ])
            .unwrap();

        assert_eq!(result.requirement().len(), 2);
        assert_eq!(result.requirement()[&flour.id], dec("7"));
        assert_eq!(result.requirement()[&sugar.id], dec("4"));
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_nested_explosion() {
        // bread = 2 dough, dough = 3 flour + 1 milk
        // 1 bread => flour 6, milk 2
        let flour = product("flour", ProductType::RawMaterial);
        let milk = product("milk", ProductType::RawMaterial);
        let dough = product("dough", ProductType::Manufactured);
        let bread = product("bread", ProductType::Manufactured);

        let graph = CatalogGraph::build(
            vec![flour.clone(), milk.clone(), dough.clone(), bread.clone()],
            vec![
                edge(&bread, &dough, "2"),
                edge(&dough, &flour, "3"),
                edge(&dough, &milk, "1"),
            ],
        )
        .unwrap();

        let result = RecipeExploder::new(&graph)
            .explode(&[OrderLine { product_id: bread.id, quantity: dec("1") }])
            .unwrap();

        assert_eq!(result.requirement()[&flour.id], dec("6"));
        assert_eq!(result.requirement()[&milk.id], dec("2"));
    }

    #[test]
    fn test_fractional_multipliers() {
        let butter = product("butter", ProductType::RawMaterial);
        let croissant = product("croissant", ProductType::Manufactured);

        let graph = CatalogGraph::build(
            vec![butter.clone(), croissant.clone()],
            vec![edge(&croissant, &butter, "0.25")],
        )
        .unwrap();

        let result = RecipeExploder::new(&graph)
            .explode(&[OrderLine { product_id: croissant.id, quantity: dec("3") }])
            .unwrap();

        assert_eq!(result.requirement()[&butter.id], dec("0.75"));
    }

    #[test]
    fn test_cycle_detected() {
        let a = product("a", ProductType::Manufactured);
        let b = product("b", ProductType::Manufactured);

        let graph = CatalogGraph::build(
            vec![a.clone(), b.clone()],
            vec![edge(&a, &b, "1"), edge(&b, &a, "1")],
        )
        .unwrap();

        let err = RecipeExploder::new(&graph)
            .explode(&[OrderLine { product_id: a.id, quantity: dec("1") }])
            .unwrap_err();

        match err {
            CatalogError::RecipeCycle(path) => {
                assert!(path.contains("a"), "cycle path should name products: {path}");
            }
            other => panic!("expected RecipeCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_direct_raw_material_flagged() {
        let flour = product("flour", ProductType::RawMaterial);
        let dough = product("dough", ProductType::Manufactured);

        let graph = CatalogGraph::build(
            vec![flour.clone(), dough.clone()],
            vec![edge(&dough, &flour, "2")],
        )
        .unwrap();

        let result = RecipeExploder::new(&graph)
            .explode(&[
                OrderLine { product_id: dough.id, quantity: dec("1") },
                OrderLine { product_id: flour.id, quantity: dec("5") },
            ])
            .unwrap();

        // Requirement covers both the recipe usage and the direct sale
        assert_eq!(result.requirement()[&flour.id], dec("7"));
        assert_eq!(result.warnings().len(), 1);

        // But only the recipe usage is debited as a sale
        let consumed = result.consumption_quantities();
        assert_eq!(consumed[&flour.id], dec("2"));
    }

    #[test]
    fn test_consumable_direct_sale_is_normal() {
        let bottle = product("bottled water", ProductType::Consumable);
        let graph = CatalogGraph::build(vec![bottle.clone()], vec![]).unwrap();

        let result = RecipeExploder::new(&graph)
            .explode(&[OrderLine { product_id: bottle.id, quantity: dec("4") }])
            .unwrap();

        assert!(result.warnings().is_empty());
        assert_eq!(result.consumption_quantities()[&bottle.id], dec("4"));
    }

    #[test]
    fn test_empty_recipe_rejected_at_build() {
        let ghost = product("ghost", ProductType::Manufactured);
        let err = CatalogGraph::build(vec![ghost], vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyRecipe(_)));
    }

    #[test]
    fn test_unknown_component_rejected_at_build() {
        let flour = product("flour", ProductType::RawMaterial);
        let dough = product("dough", ProductType::Manufactured);
        let stray = ProductComponent {
            product_id: dough.id,
            component_product_id: Uuid::new_v4(),
            quantity_per_unit: dec("1"),
        };

        let err = CatalogGraph::build(vec![flour, dough], vec![stray]).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownComponent { .. }));
    }
}
