//! # Dummy Price Oracle Blueprint
//! Component quoting fixed USD prices for fee resources, for testing the fee contract without an
//! external price feed.

use scrypto::prelude::*;

#[blueprint]
mod oracle {
    enable_method_auth! {
        methods {
            get_price => PUBLIC;
            set_price => restrict_to: [OWNER];
        }
    }

    struct Oracle {
        prices: HashMap<ResourceAddress, Decimal>,
    }

    impl Oracle {
        pub fn instantiate_oracle(fee_resource: ResourceAddress, price: Decimal) -> Global<Oracle> {
            let mut prices: HashMap<ResourceAddress, Decimal> = HashMap::new();
            prices.insert(fee_resource, price);

            Self { prices }
                .instantiate()
                .prepare_to_globalize(OwnerRole::None)
                .metadata(metadata! {
                    init {
                        "name" => "Dummy Fee Oracle".to_string(), updatable;
                        "description" => "A dummy price oracle used for testing application fees".to_string(), updatable;
                    }
                })
                .globalize()
        }

        /// USD price of one unit of `resource`.
        pub fn get_price(&self, resource: ResourceAddress) -> Decimal {
            self.prices
                .get(&resource)
                .cloned()
                .expect("Price not set for this resource")
        }

        pub fn set_price(&mut self, resource: ResourceAddress, price: Decimal) {
            self.prices.insert(resource, price);
        }
    }
}
