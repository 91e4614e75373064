use anyhow::{anyhow, Context, Result};

use pod_order::{Customer, Destination, Mode, Order, OrderClient, ShippingOption};

use super::ClientContext;

fn new_order(client: &OrderClient, destination: Destination, products: &[(String, u32)]) -> Result<Order> {
    let mut order = client.new_order().with_destination(destination);
    for (id, qty) in products {
        order
            .add_product(id, *qty)
            .with_context(|| format!("invalid product '{id}'"))?;
    }
    Ok(order)
}

fn print_options(options: &[ShippingOption]) {
    println!("options={}", options.len());
    for (i, o) in options.iter().enumerate() {
        println!(
            "option index={} name={:?} delivery={:?} price={:.2}",
            i,
            o.name(),
            o.delivery_estimate(),
            o.price()
        );
    }
}

pub fn quote(
    ctx: &ClientContext,
    destination: Destination,
    products: &[(String, u32)],
    dry_run: bool,
) -> Result<()> {
    let client = ctx.client()?;
    let mut order = new_order(&client, destination, products)?;

    let options = order
        .quote_shipping_options(dry_run)
        .context("SHIPPING_QUOTE_FAILED")?;

    println!("config_hash={}", ctx.loaded.config_hash);
    println!("dry_run={dry_run}");
    println!("product_count={}", order.product_count());
    print_options(&options);
    Ok(())
}

pub struct SubmitArgs {
    pub destination: Destination,
    pub customer: Customer,
    pub products: Vec<(String, u32)>,
    /// Cheapest option when `None`.
    pub shipping: Option<String>,
    pub dry_run: bool,
    pub poll_status: bool,
}

/// Exact name match, else the cheapest option (first one on a price tie).
fn choose<'a>(options: &'a [ShippingOption], wanted: Option<&str>) -> Result<&'a ShippingOption> {
    match wanted {
        Some(name) => options.iter().find(|o| o.name() == name).ok_or_else(|| {
            let available: Vec<&str> = options.iter().map(ShippingOption::name).collect();
            anyhow!(
                "SHIPPING_OPTION_NOT_FOUND: '{}' is not in the quote (available: {:?})",
                name,
                available
            )
        }),
        None => options
            .iter()
            .min_by(|a, b| a.price().total_cmp(&b.price()))
            .ok_or_else(|| anyhow!("SHIPPING_OPTION_NOT_FOUND: the provider returned no options")),
    }
}

pub fn submit(ctx: &ClientContext, args: SubmitArgs) -> Result<()> {
    let client = ctx.client()?;
    let mut order = new_order(&client, args.destination, &args.products)?
        .with_customer(args.customer);

    let options = order
        .quote_shipping_options(false)
        .context("SHIPPING_QUOTE_FAILED")?;
    let option = choose(&options, args.shipping.as_deref())?;
    order.select_shipping_option(option)?;

    let mode = Mode::from_dry_run(args.dry_run);
    let order_id = order.submit(args.dry_run).context("ORDER_SUBMIT_FAILED")?;

    println!("config_hash={}", ctx.loaded.config_hash);
    println!("mode={}", mode.as_str());
    println!("shipping={:?}", option.name());
    println!("product_count={}", order.product_count());
    println!("order_id={order_id}");

    if args.poll_status {
        let status = order.order_status().context("ORDER_STATUS_FAILED")?;
        println!("status={}", status.status.as_deref().unwrap_or(""));
        println!("tracking_type={}", status.tracking_type.as_deref().unwrap_or(""));
        println!("tracking_id={}", status.tracking_id.as_deref().unwrap_or(""));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> Vec<ShippingOption> {
        vec![
            ShippingOption::new("UPS Ground", "1-5 days", 7.5, 0).unwrap(),
            ShippingOption::new("USPS First Class Mail", "2-5 days", 0.0, 1).unwrap(),
            ShippingOption::new("Media Mail", "5-10 days", 0.0, 2).unwrap(),
        ]
    }

    #[test]
    fn choose_defaults_to_cheapest_first_on_tie() {
        let options = opts();
        assert_eq!(choose(&options, None).unwrap().name(), "USPS First Class Mail");
    }

    #[test]
    fn choose_by_exact_name() {
        let options = opts();
        assert_eq!(choose(&options, Some("UPS Ground")).unwrap().origin_index(), 0);
        let err = choose(&options, Some("ups ground")).unwrap_err().to_string();
        assert!(err.starts_with("SHIPPING_OPTION_NOT_FOUND"), "{err}");
    }

    #[test]
    fn choose_from_empty_quote_fails() {
        assert!(choose(&[], None).is_err());
    }
}
