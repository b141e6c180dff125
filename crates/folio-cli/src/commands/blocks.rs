use crate::app::{AppContext, FolioWorkspace};
use crate::cli::{BlockAddArgs, BlockEditArgs, BlockIndexArgs, BlockMoveArgs, ProjectRef};
use crate::errors::CliError;
use crate::ui::{badge, print, receipt, Badge, OutputMode};

/// Open the target project and return its block count.
fn open_target(workspace: &mut FolioWorkspace, target: &ProjectRef) -> anyhow::Result<usize> {
    let open = workspace.open(&target.category, &target.project)?;
    Ok(open.document().len())
}

fn check_index(index: usize, len: usize) -> anyhow::Result<()> {
    if index >= len {
        return Err(CliError::invalid_input(format!(
            "Block index {} is out of range (page has {} block{})",
            index,
            len,
            if len == 1 { "" } else { "s" }
        ))
        .into());
    }
    Ok(())
}

fn print_unchanged(ctx: &AppContext, message: &str) {
    if ctx.quiet() {
        return;
    }
    let ui_ctx = ctx.ui_context(false, None);
    match ui_ctx.mode {
        OutputMode::Pretty => print(&ui_ctx, &badge(&ui_ctx, Badge::Info, message)),
        OutputMode::Plain | OutputMode::Json => println!("status=unchanged"),
    }
}

pub fn handle_block_add(ctx: &AppContext, args: &BlockAddArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    open_target(&mut workspace, &args.target)?;
    let index = workspace.insert_block(args.kind, args.at)?;
    if let Some(text) = args.text.as_deref() {
        workspace.update_block(index, text)?;
    }
    workspace.close()?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                "Block added",
                &[("Index", &index.to_string()), ("Kind", args.kind.as_str())],
            ),
        );
    }
    Ok(())
}

pub fn handle_block_edit(ctx: &AppContext, args: &BlockEditArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    let len = open_target(&mut workspace, &args.target)?;
    check_index(args.index, len)?;
    let changed = workspace.update_block(args.index, &args.text)?;
    workspace.close()?;

    if !changed {
        print_unchanged(ctx, "Block unchanged");
    } else if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        print(
            &ui_ctx,
            &receipt(&ui_ctx, "Block updated", &[("Index", &args.index.to_string())]),
        );
    }
    Ok(())
}

pub fn handle_block_delete(ctx: &AppContext, args: &BlockIndexArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    let len = open_target(&mut workspace, &args.target)?;
    check_index(args.index, len)?;
    let removed = workspace.delete_block(args.index)?;
    workspace.close()?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        let kind = removed
            .map(|block| block.kind().as_str())
            .unwrap_or("none");
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                "Block deleted",
                &[("Index", &args.index.to_string()), ("Kind", kind)],
            ),
        );
    }
    Ok(())
}

pub fn handle_block_move(ctx: &AppContext, args: &BlockMoveArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    let len = open_target(&mut workspace, &args.target)?;
    check_index(args.index, len)?;
    let moved = workspace.move_block(args.index, args.direction)?;
    workspace.close()?;

    if !moved {
        print_unchanged(ctx, &format!("Block {} is already at the edge", args.index));
    } else if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                "Block moved",
                &[
                    ("Index", &args.index.to_string()),
                    ("Direction", &args.direction.to_string()),
                ],
            ),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::exit_code;
    use crate::constants::exit_codes;

    #[test]
    fn test_check_index_bounds() {
        assert!(check_index(0, 1).is_ok());
        let err = check_index(3, 3).unwrap_err();
        assert_eq!(exit_code(&err), exit_codes::INVALID_INPUT);
        assert!(err.to_string().contains("page has 3 blocks"));
        assert!(check_index(1, 1).unwrap_err().to_string().contains("1 block)"));
    }
}
