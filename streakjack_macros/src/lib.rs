use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{parse::Parser, punctuated::Punctuated, Ident, Token};

/// This macro is added before a method of `Simulator` struct in the impl block.
/// Use this macro to first check if current simulation phase is one of the phases
/// in the attribute.
///
/// For example, `#[allowed_phase(Running)]` will make a method first check
/// if current simulation phase is `Running`. If not, the method will return
/// `SimulationError::PhaseNotAllowed` naming the method and the actual phase.
/// Several phases may be given, separated by commas.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream1, item: TokenStream1) -> TokenStream1 {
    let mut ast: syn::ImplItemFn = match syn::parse(item) {
        Ok(ast) => ast,
        Err(err) => return err.to_compile_error().into(),
    };
    let phases = match Punctuated::<Ident, Token![,]>::parse_terminated.parse(attr) {
        Ok(phases) => phases,
        Err(err) => return err.to_compile_error().into(),
    };
    if phases.is_empty() {
        let err = syn::Error::new_spanned(&ast.sig.ident, "allowed_phase needs at least one phase");
        return err.to_compile_error().into();
    }

    let guard = phase_guard(&ast.sig.ident.to_string(), &phases);
    let early_return: syn::Stmt = match syn::parse2(guard) {
        Ok(stmt) => stmt,
        Err(err) => return err.to_compile_error().into(),
    };
    ast.block.stmts.insert(0, early_return);
    ast.into_token_stream().into()
}

fn phase_guard(function_name: &str, phases: &Punctuated<Ident, Token![,]>) -> TokenStream2 {
    let phases = phases.iter();
    quote! {
        if !matches!(self.phase, #(SimulationPhase::#phases)|*) {
            return Err(SimulationError::PhaseNotAllowed {
                operation: #function_name,
                phase: self.phase,
            });
        }
    }
}
