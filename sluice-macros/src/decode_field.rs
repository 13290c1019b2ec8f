use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Field, GenericArgument, Ident, LitStr, PathArguments, Type, parse::ParseBuffer};

/// How a child entity is held by its parent.
pub(crate) enum ChildHolder {
    Plain,
    Boxed,
    Optional,
    OptionalBoxed,
}

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) name: String,
    /// Holder and entity type of a child field.
    pub(crate) child: Option<(ChildHolder, Type)>,
}

/// `None` for the fields marked `#[sluice(ignore)]`.
pub(crate) fn decode_field(field: &Field) -> Option<FieldMetadata> {
    let Some(ident) = field.ident.clone() else {
        panic!("Entity can only be derived for structs with named fields");
    };
    let mut name = ident.to_string().trim_start_matches("r#").to_string();
    let mut child = false;
    let mut ignore = false;
    for attr in &field.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("sluice") {
            let Ok(list) = meta.require_list() else {
                panic!("Error while parsing `sluice`, use it like: `#[sluice(attribute = value, ..)]`");
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!(
                            "Error while parsing `name`, use it like: `#[sluice(name = \"ProductName\")]`"
                        );
                    };
                    name = v.value();
                } else if arg.path.is_ident("child") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `child`, use it like: `#[sluice(child)]`");
                    };
                    child = true;
                } else if arg.path.is_ident("ignore") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `ignore`, use it like: `#[sluice(ignore)]`");
                    };
                    ignore = true;
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
    if ignore {
        return None;
    }
    let child = child.then(|| decode_child(&field.ty));
    Some(FieldMetadata {
        ident,
        ty: field.ty.clone(),
        name,
        child,
    })
}

/// Single generic argument of `ty` when its last segment is `wrapper`.
fn unwrap_type<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first()? {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    }
}

fn decode_child(ty: &Type) -> (ChildHolder, Type) {
    if let Some(inner) = unwrap_type(ty, "Option") {
        match unwrap_type(inner, "Box") {
            Some(entity) => (ChildHolder::OptionalBoxed, entity.clone()),
            None => (ChildHolder::Optional, inner.clone()),
        }
    } else if let Some(entity) = unwrap_type(ty, "Box") {
        (ChildHolder::Boxed, entity.clone())
    } else {
        (ChildHolder::Plain, ty.clone())
    }
}

impl FieldMetadata {
    pub(crate) fn field_def(&self) -> TokenStream {
        let name = &self.name;
        let kind = match &self.child {
            Some((_, entity)) => {
                quote!(::sluice::FieldKind::Child(<#entity as ::sluice::Entity>::field_defs))
            }
            None => quote!(::sluice::FieldKind::Value),
        };
        quote!(::sluice::FieldDef { name: #name, kind: #kind })
    }

    /// Expression of type `Option<&mut dyn EntityFields>`, the child gets created when absent.
    pub(crate) fn child_mut(&self) -> TokenStream {
        let ident = &self.ident;
        match &self.child {
            None => quote!(None),
            Some((ChildHolder::Plain, _)) => {
                quote!(Some(&mut self.#ident as &mut dyn ::sluice::EntityFields))
            }
            Some((ChildHolder::Boxed, _)) => {
                quote!(Some(&mut *self.#ident as &mut dyn ::sluice::EntityFields))
            }
            Some((ChildHolder::Optional, _)) => quote!(Some(
                self.#ident.get_or_insert_with(::std::default::Default::default)
                    as &mut dyn ::sluice::EntityFields
            )),
            Some((ChildHolder::OptionalBoxed, _)) => quote!(Some(
                &mut **self.#ident.get_or_insert_with(::std::default::Default::default)
                    as &mut dyn ::sluice::EntityFields
            )),
        }
    }

    /// Expression of type `Option<&dyn EntityFields>`.
    pub(crate) fn child(&self) -> TokenStream {
        let ident = &self.ident;
        match &self.child {
            None => quote!(None),
            Some((ChildHolder::Plain, _)) => {
                quote!(Some(&self.#ident as &dyn ::sluice::EntityFields))
            }
            Some((ChildHolder::Boxed, _)) => {
                quote!(Some(&*self.#ident as &dyn ::sluice::EntityFields))
            }
            Some((ChildHolder::Optional, _)) => quote!(
                self.#ident.as_ref().map(|v| v as &dyn ::sluice::EntityFields)
            ),
            Some((ChildHolder::OptionalBoxed, _)) => quote!(
                self.#ident.as_deref().map(|v| v as &dyn ::sluice::EntityFields)
            ),
        }
    }
}
