use serde_json::{json, Value};

use crate::action::Arguments;
use crate::catalog::{Catalog, Stock};

pub const NOT_FOUND: &str = "Product not found.";
pub const INTERACTION_ENDED: &str = "Interaction ended.";

/// The functions the assistant may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    GetAllProducts,
    GetProductInfo,
    GetProductStock,
    /// Terminal signal: the conversation is over.
    End,
}

impl Tool {
    pub const ALL: [Tool; 4] = [
        Tool::GetAllProducts,
        Tool::GetProductInfo,
        Tool::GetProductStock,
        Tool::End,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "get_all_products" => Some(Tool::GetAllProducts),
            "get_product_info" => Some(Tool::GetProductInfo),
            "get_product_stock" => Some(Tool::GetProductStock),
            "END" => Some(Tool::End),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::GetAllProducts => "get_all_products",
            Tool::GetProductInfo => "get_product_info",
            Tool::GetProductStock => "get_product_stock",
            Tool::End => "END",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Tool::GetAllProducts => "List the names of every product in the catalog.",
            Tool::GetProductInfo => "Get the description and price of a product by its exact name.",
            Tool::GetProductStock => "Get the stock availability of a product by its exact name.",
            Tool::End => "End the interaction when the customer has no further questions.",
        }
    }

    fn parameters(self) -> Value {
        match self {
            Tool::GetProductInfo | Tool::GetProductStock => json!({
                "type": "object",
                "properties": {
                    "Name": {
                        "type": "string",
                        "description": "Exact product name as listed in the catalog."
                    }
                },
                "required": ["Name"]
            }),
            Tool::GetAllProducts | Tool::End => json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    /// Function-tool definition in the shape the Assistants API expects.
    pub fn definition(self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name(),
                "description": self.description(),
                "parameters": self.parameters(),
            }
        })
    }
}

pub fn definitions() -> Vec<Value> {
    Tool::ALL.iter().map(|tool| tool.definition()).collect()
}

/// Resolves one decoded call against the catalog.
///
/// Every outcome is text: a miss is an answer for the customer, not an error.
pub fn resolve(tool: Tool, args: &Arguments, catalog: &Catalog) -> String {
    match tool {
        Tool::GetAllProducts => all_products(catalog),
        Tool::GetProductInfo => product_info(catalog, args.name()),
        Tool::GetProductStock => product_stock(catalog, args.name()),
        Tool::End => INTERACTION_ENDED.to_string(),
    }
}

pub fn unsupported(function_name: &str) -> String {
    format!("Unsupported tool: {function_name}.")
}

pub fn invalid_arguments(function_name: &str) -> String {
    format!("Invalid arguments for {function_name}.")
}

fn all_products(catalog: &Catalog) -> String {
    let names: Vec<&str> = catalog.iter().map(|p| p.name.as_str()).collect();
    format!("The available products are: {}.", names.join(", "))
}

fn product_info(catalog: &Catalog, name: &str) -> String {
    match catalog.lookup(name) {
        Some(product) => format!(
            "The product is {} with description: {} and price: {}.",
            product.name, product.description, product.price
        ),
        None => NOT_FOUND.to_string(),
    }
}

fn product_stock(catalog: &Catalog, name: &str) -> String {
    match catalog.lookup(name) {
        Some(product) => match product.stock {
            Stock::Available(units) => format!(
                "The product {} is in stock with availability: {}.",
                product.name, units
            ),
            Stock::OutOfStock => {
                format!("The product {} is currently out of stock.", product.name)
            }
        },
        None => NOT_FOUND.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::decode_arguments;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"[
                {"Name": "Apple MacBook Pro", "Description": "16-inch, 16GB RAM, 1TB SSD", "Price": 2399, "Stock_availability": 15},
                {"Name": "Sony PlayStation 5", "Description": "825GB SSD, 4K Gaming Console", "Price": 499, "Stock_availability": 0},
                {"Name": "Apple AirPods Pro", "Description": "Active Noise Cancellation, Wireless Charging", "Price": 249, "Stock_availability": 50}
            ]"#,
        )
        .unwrap()
    }

    fn args(raw: &str) -> Arguments {
        decode_arguments(raw).unwrap()
    }

    #[test]
    fn lists_all_products_in_order() {
        let output = resolve(Tool::GetAllProducts, &args("{}"), &catalog());
        assert_eq!(
            output,
            "The available products are: Apple MacBook Pro, Sony PlayStation 5, Apple AirPods Pro."
        );
    }

    #[test]
    fn list_ignores_arguments() {
        let catalog = catalog();
        let plain = resolve(Tool::GetAllProducts, &args("{}"), &catalog);
        let noisy = resolve(
            Tool::GetAllProducts,
            &args(r#"{"Name": "Sony PlayStation 5", "limit": 1}"#),
            &catalog,
        );
        assert_eq!(plain, noisy);
    }

    #[test]
    fn empty_catalog_lists_nothing() {
        let output = resolve(Tool::GetAllProducts, &args("{}"), &Catalog::default());
        assert_eq!(output, "The available products are: .");
    }

    #[test]
    fn product_info_formats_found_record() {
        let output = resolve(
            Tool::GetProductInfo,
            &args(r#"{"Name": "Apple MacBook Pro"}"#),
            &catalog(),
        );
        assert_eq!(
            output,
            "The product is Apple MacBook Pro with description: 16-inch, 16GB RAM, 1TB SSD and price: 2399."
        );
    }

    #[test]
    fn product_info_misses_are_not_found() {
        let catalog = catalog();
        let long_name = "A".repeat(1000);
        let names = [
            "",
            "   ",
            "TabletXYZ",
            "apple macbook pro",
            "Laptop; DROP TABLES;",
            "<script>alert('hack')</script>",
            "商品",
            long_name.as_str(),
            "@@@###$$$",
            "Laptop123!@#",
        ];

        for name in names {
            let raw = json!({ "Name": name }).to_string();
            assert_eq!(
                resolve(Tool::GetProductInfo, &args(&raw), &catalog),
                NOT_FOUND,
                "name {name:?} should not match"
            );
        }
    }

    #[test]
    fn product_info_without_name_is_not_found() {
        let output = resolve(Tool::GetProductInfo, &args("{}"), &catalog());
        assert_eq!(output, NOT_FOUND);
    }

    #[test]
    fn stock_reports_availability() {
        let output = resolve(
            Tool::GetProductStock,
            &args(r#"{"Name": "Apple AirPods Pro"}"#),
            &catalog(),
        );
        assert_eq!(
            output,
            "The product Apple AirPods Pro is in stock with availability: 50."
        );
    }

    #[test]
    fn zero_stock_is_out_of_stock_not_missing() {
        let output = resolve(
            Tool::GetProductStock,
            &args(r#"{"Name": "Sony PlayStation 5"}"#),
            &catalog(),
        );
        assert_eq!(output, "The product Sony PlayStation 5 is currently out of stock.");
    }

    #[test]
    fn stock_for_unknown_product_is_not_found() {
        let output = resolve(
            Tool::GetProductStock,
            &args(r#"{"Name": "TabletXYZ"}"#),
            &catalog(),
        );
        assert_eq!(output, NOT_FOUND);
    }

    #[test]
    fn repeated_calls_are_stable() {
        let catalog = catalog();
        let call = args(r#"{"Name": "Apple MacBook Pro"}"#);
        let first = resolve(Tool::GetProductStock, &call, &catalog);
        let second = resolve(Tool::GetProductStock, &call, &catalog);
        assert_eq!(first, second);
    }

    #[test]
    fn tool_names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("end"), None);
        assert_eq!(Tool::from_name("get_product_price"), None);
    }

    #[test]
    fn definitions_cover_every_tool() {
        let defs = definitions();
        let names: Vec<&str> = defs
            .iter()
            .filter_map(|d| d["function"]["name"].as_str())
            .collect();

        assert_eq!(
            names,
            ["get_all_products", "get_product_info", "get_product_stock", "END"]
        );
        assert_eq!(
            defs[1]["function"]["parameters"]["required"],
            json!(["Name"])
        );
    }
}
