use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{parenthesized, Attribute, Error as SynError, LitStr, Meta, Result as SynResult, Token, Type};

#[derive(Debug, Default)]
pub struct BeanAttributes {
    pub interfaces: Vec<Type>,
}

/// Parses every `#[bean(implements(dyn A, dyn B))]` on an item.
pub fn parse_bean_attributes(attrs: &[Attribute]) -> SynResult<BeanAttributes> {
    let mut data = BeanAttributes::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("bean")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("implements") {
                return Err(meta.error("expects `#[bean(implements(dyn Trait, ...))]`"));
            }

            let content;
            parenthesized!(content in meta.input);
            let types = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
            for ty in types {
                if !matches!(ty, Type::TraitObject(_)) {
                    return Err(SynError::new(
                        ty.span(),
                        "expects a trait object type such as `dyn Trait`",
                    ));
                }
                data.interfaces.push(ty);
            }
            Ok(())
        })?;
    }

    Ok(data)
}

#[derive(Debug)]
pub enum InjectAttribute {
    Absent,
    Marked { qualifier: Option<LitStr> },
}

/// Parses `#[inject]` or `#[inject("name")]` on a field.
pub fn parse_inject_attribute(attrs: &[Attribute]) -> SynResult<InjectAttribute> {
    let mut res = InjectAttribute::Absent;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("inject")) {
        if let InjectAttribute::Marked { .. } = res {
            return Err(SynError::new(
                attr.span(),
                "only one `#[inject]` is allowed on a field",
            ));
        }

        res = match &attr.meta {
            Meta::Path(_) => InjectAttribute::Marked { qualifier: None },
            Meta::List(list) => InjectAttribute::Marked {
                qualifier: Some(list.parse_args::<LitStr>().map_err(|err| {
                    SynError::new(err.span(), "expects `#[inject(\"bean name\")]`")
                })?),
            },
            Meta::NameValue(nv) => {
                return Err(SynError::new(
                    nv.span(),
                    "expects `#[inject]` or `#[inject(\"bean name\")]`",
                ))
            }
        };
    }

    Ok(res)
}
