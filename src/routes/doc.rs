use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{CartLineDto, CartView},
        orders::{CheckoutRequest, OrderDetail, OrderLineDto, OrderList, OrderWithItems},
    },
    models::{Order, OrderItem, PaymentMethod, Product},
    money::Money,
    response::{ApiResponse, Meta},
    routes::{
        cart,
        health::{self, HealthData},
        orders,
        params::{self, SortOrder},
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        cart::view_cart,
        cart::add_to_cart,
        cart::remove_line,
        cart::increment_line,
        cart::decrement_line,
        cart::checkout,
        orders::list_orders,
        orders::get_order,
        orders::download_bill,
    ),
    components(
        schemas(
            Money,
            Product,
            PaymentMethod,
            Order,
            OrderItem,
            CartLineDto,
            CartView,
            CheckoutRequest,
            OrderLineDto,
            OrderDetail,
            OrderList,
            OrderWithItems,
            HealthData,
            SortOrder,
            params::Pagination,
            Meta,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<OrderDetail>,
            ApiResponse<HealthData>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Cart", description = "Cart and checkout endpoints"),
        (name = "Orders", description = "Order history and receipts"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
