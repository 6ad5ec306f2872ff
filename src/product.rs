pub struct ProductDetails {
    pub name: &'static str,
    pub description: &'static str,
    pub price: &'static str,
    pub info: &'static [(&'static str, &'static str)],
}

pub const RUBBER_DUCK: ProductDetails = ProductDetails {
    name: "Rubber Duck",
    description: "This premium rubber duck is perfect for debugging your code and keeping you \
                  company during long coding sessions.",
    price: "$19.99",
    info: &[
        ("Material", "Premium Rubber"),
        ("Dimensions", "10cm x 8cm x 9cm"),
        ("Weight", "120g"),
        ("Warranty", "1 Year"),
    ],
};
