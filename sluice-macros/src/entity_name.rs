use quote::ToTokens;
use syn::{ItemStruct, LitStr, parse::ParseBuffer};

pub(crate) fn entity_name(item: &ItemStruct) -> String {
    let mut name = item.ident.to_string();
    for attr in &item.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("sluice") {
            let Ok(list) = meta.require_list() else {
                panic!("Error while parsing `sluice`, use it like: `#[sluice(attribute = value, ..)]`");
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!(
                            "Error while parsing `name`, use it like: `#[sluice(name = \"Product\")]`"
                        );
                    };
                    name = value.value();
                } else {
                    panic!(
                        "Unknown attribute `{}` inside sluice macro",
                        arg.path.to_token_stream()
                    );
                }
                Ok(())
            });
        }
    }
    name
}
