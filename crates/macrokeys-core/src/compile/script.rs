// Macrokeys Script Emitter
// Lowers a validated configuration into an AutoHotkey v2 script

use strum::IntoEnumIterator;

use crate::config::{Config, Edge, Layer, GLOBAL_PROGRAM};
use crate::key;

use super::catchlist::{join_vks, profile_vks};
use super::emit::{escape_str, Node};
use super::ident::macro_ident;
use super::CompileOptions;

/// Message code of raw keyboard reports posted by the helper
const RAW_KEY_MESSAGE: u32 = 1325;

pub(crate) fn emit_script(config: &Config, opts: &CompileOptions) -> String {
    let mut out = String::new();
    emit_header(&mut out, opts);
    emit_helper_guard(&mut out, opts);
    emit_macro_functions(&mut out, config);
    emit_globals(&mut out, config);
    emit_runtime(&mut out, opts);
    out
}

fn emit_header(out: &mut String, opts: &CompileOptions) {
    out.push_str(
        "#Requires AutoHotkey v2.0\n\
         Persistent\n\
         #SingleInstance\n\
         SendMode \"Input\"\n\
         SetWorkingDir A_InitialWorkingDir\n\
         \n\
         ; Generated by macrokeys. Do not edit directly.\n\n",
    );
    if let Some(include) = &opts.include_path {
        out.push_str(&format!("#Include {include}\n\n"));
    }
}

fn emit_helper_guard(out: &mut String, opts: &CompileOptions) {
    let base = helper_base_name(&opts.helper_exe);
    out.push_str(&format!(
        "if !ProcessExist(\"{base}\") {{\n    try {{\n        Run \"{path}\"\n    }} catch {{\n        MsgBox \"Could not start {base}. Please ensure it is at the correct path.\"\n    }}\n}}\n\n",
        base = escape_str(&base),
        path = escape_str(&opts.helper_exe),
    ));
}

/// Lift every non-empty binding side into a named callable whose body
/// is the user's fragment verbatim.
fn emit_macro_functions(out: &mut String, config: &Config) {
    out.push_str("; --- Synthesized macro callables ---\n\n");
    for_each_binding(config, |entry| {
        for edge in [Edge::Down, Edge::Up] {
            let Some(script) = entry.binding.script(edge) else {
                continue;
            };
            let ident = macro_ident(entry.program, entry.profile, entry.layer, entry.key_name, edge);
            out.push_str(&format!("{ident}() {{\n"));
            for line in script.lines() {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
            out.push_str("}\n\n");
        }
    });
}

/// Serialize the model into the script's global tables, all rendered
/// through the emit tree.
fn emit_globals(out: &mut String, config: &Config) {
    out.push_str("; --- Serialized configuration ---\n\n");

    // Active profile per program; mutated by cycling at runtime.
    let profiles = Node::Map(
        config
            .programs
            .iter()
            .map(|(key, program)| (Node::str(key.clone()), Node::str(program.active_profile.clone())))
            .collect(),
    );
    push_global(out, "Profiles", &profiles);

    let order = Node::Map(
        config
            .programs
            .iter()
            .map(|(key, program)| {
                (
                    Node::str(key.clone()),
                    Node::List(program.profiles.keys().map(|name| Node::str(name.clone())).collect()),
                )
            })
            .collect(),
    );
    push_global(out, "ProfileOrder", &order);

    let display = Node::Map(
        config
            .programs
            .iter()
            .map(|(key, program)| {
                let name = if program.display_name.is_empty() {
                    key.clone()
                } else {
                    program.display_name.clone()
                };
                (Node::str(key.clone()), Node::str(name))
            })
            .collect(),
    );
    push_global(out, "DisplayNames", &display);

    // Cycle hotkeys that resolve to a VK code; unresolvable names
    // are inert.
    let cycle = Node::Map(
        config
            .programs
            .iter()
            .filter_map(|(key, program)| {
                key::vk_from_name(&program.cycle_hotkey)
                    .map(|vk| (Node::str(key.clone()), Node::int(vk)))
            })
            .collect(),
    );
    push_global(out, "CycleVk", &cycle);

    // Declaration-ordered context scan list; first match wins. Title
    // filters are prefix matches, so this must stay a linear scan.
    let contexts = Node::List(
        config
            .programs
            .iter()
            .filter(|(key, program)| key.as_str() != GLOBAL_PROGRAM && !program.exe_name.is_empty())
            .map(|(key, program)| {
                let wintitle = if program.window_title.is_empty() {
                    format!("ahk_exe {}", program.exe_name)
                } else {
                    format!("{} ahk_exe {}", program.window_title, program.exe_name)
                };
                Node::Map(vec![
                    (Node::str("key"), Node::str(key.clone())),
                    (Node::str("wintitle"), Node::str(wintitle)),
                ])
            })
            .collect(),
    );
    push_global(out, "Contexts", &contexts);

    let layer_vks = Node::Map(
        config
            .programs
            .iter()
            .flat_map(|(key, program)| {
                program.profiles.iter().map(move |(profile_name, profile)| {
                    (
                        Node::str(format!("{key}|{profile_name}")),
                        Node::str(join_vks(&profile_vks(profile))),
                    )
                })
            })
            .collect(),
    );
    push_global(out, "LayerVks", &layer_vks);

    // The dispatch table: one slot per bound edge, mapping directly
    // to the callable. Lookup at runtime is by slot key only.
    let mut macros = Vec::new();
    for_each_binding(config, |entry| {
        let Some(vk) = key::vk_from_name(entry.key_name) else {
            return;
        };
        for edge in [Edge::Down, Edge::Up] {
            if entry.binding.script(edge).is_none() {
                continue;
            }
            let slot = format!(
                "{}|{}|{}|{}|{}",
                entry.program,
                entry.profile,
                entry.layer,
                vk,
                edge.slot()
            );
            let ident = macro_ident(entry.program, entry.profile, entry.layer, entry.key_name, edge);
            macros.push((Node::str(slot), Node::lit(ident)));
        }
    });
    push_global(out, "Macros", &Node::Map(macros));
}

fn push_global(out: &mut String, name: &str, node: &Node) {
    out.push_str(&format!("global {name} := {}\n\n", node.render()));
}

fn emit_runtime(out: &mut String, opts: &CompileOptions) {
    let helper_base = escape_str(&helper_base_name(&opts.helper_exe));
    let device = opts.device_number;
    let port = opts.catch_port;
    let poll = opts.poll_interval_ms;

    out.push_str(&format!(
        "OnMessage({RAW_KEY_MESSAGE}, RawKeyMsg)\nSetTimer(RefreshCatchList, {poll})\nRefreshCatchList()\n\n"
    ));

    out.push_str(&format!(
        "RawKeyMsg(wParam, lParam, msg, hwnd) {{\n    if (wParam != {device})\n        return\n"
    ));
    out.push_str(
        "    vk := lParam & 0xFF\n\
         \x20   isDown := (lParam & 0x100) > 0\n\
         \x20   ctrl := (lParam & 0x800) > 0 || (lParam & 0x1000) > 0\n\
         \x20   alt := (lParam & 0x2000) > 0 || (lParam & 0x4000) > 0\n\
         \x20   shift := (lParam & 0x8000) > 0\n\
         \x20   DispatchKey(vk, isDown, shift, ctrl, alt)\n}\n\n",
    );

    out.push_str(
        "ResolveContext() {\n\
         \x20   global Contexts\n\
         \x20   for ctx in Contexts {\n\
         \x20       if WinActive(ctx[\"wintitle\"])\n\
         \x20           return ctx[\"key\"]\n\
         \x20   }\n\
         \x20   return \"Global\"\n}\n\n",
    );

    out.push_str(
        "DispatchKey(vk, isDown, shift, ctrl, alt) {\n\
         \x20   global Profiles, Macros\n\
         \x20   if (!shift && !ctrl && !alt)\n\
         \x20       layer := \"base\"\n\
         \x20   else if (shift && !ctrl && !alt)\n\
         \x20       layer := \"shift\"\n\
         \x20   else if (ctrl && !shift && !alt)\n\
         \x20       layer := \"ctrl\"\n\
         \x20   else if (alt && !shift && !ctrl)\n\
         \x20       layer := \"alt\"\n\
         \x20   else\n\
         \x20       return\n\
         \x20   ctx := ResolveContext()\n\
         \x20   if (layer == \"base\" && TryCycle(ctx, vk, isDown))\n\
         \x20       return\n\
         \x20   if (ctx != \"Global\") {\n\
         \x20       slot := ctx \"|\" Profiles[ctx] \"|\" layer \"|\" vk\n\
         \x20       if (Macros.Has(slot \"|down\") || Macros.Has(slot \"|up\")) {\n\
         \x20           ; The program claims this key on either edge;\n\
         \x20           ; never fall through to Global for it.\n\
         \x20           InvokeMacro(slot \"|\" (isDown ? \"down\" : \"up\"))\n\
         \x20           return\n\
         \x20       }\n\
         \x20       if (layer == \"base\" && TryCycle(\"Global\", vk, isDown))\n\
         \x20           return\n\
         \x20   }\n\
         \x20   slot := \"Global|\" Profiles[\"Global\"] \"|\" layer \"|\" vk\n\
         \x20   if (Macros.Has(slot \"|down\") || Macros.Has(slot \"|up\"))\n\
         \x20       InvokeMacro(slot \"|\" (isDown ? \"down\" : \"up\"))\n}\n\n",
    );

    out.push_str(
        "TryCycle(ctx, vk, isDown) {\n\
         \x20   global Profiles, ProfileOrder, CycleVk, DisplayNames\n\
         \x20   if (!CycleVk.Has(ctx) || vk != CycleVk[ctx])\n\
         \x20       return false\n\
         \x20   if (isDown)\n\
         \x20       return true\n\
         \x20   order := ProfileOrder[ctx]\n\
         \x20   current := 0\n\
         \x20   for i, name in order {\n\
         \x20       if (name == Profiles[ctx])\n\
         \x20           current := i\n\
         \x20   }\n\
         \x20   Profiles[ctx] := order[Mod(current, order.Length) + 1]\n\
         \x20   ShowProfileToast(DisplayNames[ctx] \" > \" Profiles[ctx])\n\
         \x20   RefreshCatchList()\n\
         \x20   return true\n}\n\n",
    );

    out.push_str(
        "InvokeMacro(slot) {\n\
         \x20   global Macros\n\
         \x20   if (!Macros.Has(slot))\n\
         \x20       return\n\
         \x20   fn := Macros[slot]\n\
         \x20   try {\n\
         \x20       fn()\n\
         \x20   } catch as err {\n\
         \x20       MsgBox \"Macro \" fn.Name \" failed: \" err.Message\n\
         \x20   }\n}\n\n",
    );

    out.push_str(
        "ShowProfileToast(text) {\n\
         \x20   toast := Gui(\"+AlwaysOnTop -Caption +ToolWindow\", \"Profile Toast\")\n\
         \x20   toast.BackColor := \"E6E6E6\"\n\
         \x20   toast.SetFont(\"s18 c1A1A1A\", \"Segoe UI\")\n\
         \x20   toast.Add(\"Text\", \"w300 Center\", text)\n\
         \x20   toast.Show(\"NoActivate\")\n\
         \x20   SetTimer(() => toast.Destroy(), -2000)\n}\n\n",
    );

    out.push_str(
        "RefreshCatchList() {\n\
         \x20   global Profiles, LayerVks, CycleVk\n\
         \x20   seen := Map()\n\
         \x20   ctx := ResolveContext()\n\
         \x20   for slot in [ctx \"|\" Profiles[ctx], \"Global|\" Profiles[\"Global\"]] {\n\
         \x20       if (!LayerVks.Has(slot))\n\
         \x20           continue\n\
         \x20       for code in StrSplit(LayerVks[slot], \",\") {\n\
         \x20           if (code != \"\")\n\
         \x20               seen[code] := true\n\
         \x20       }\n\
         \x20   }\n\
         \x20   for , code in CycleVk\n\
         \x20       seen[String(code)] := true\n\
         \x20   list := \"\"\n\
         \x20   for code, unused in seen\n\
         \x20       list .= (list == \"\" ? \"\" : \",\") . code\n",
    );
    out.push_str(&format!(
        "    SendCatchList('{{\"DeviceNumber\": {device}, \"CatchVKCodes\": \"' list '\"}}`n')\n}}\n\n"
    ));

    // One connection per push: open, send, close. Failures are
    // swallowed so a missing helper never blocks dispatch.
    out.push_str(
        "SendCatchList(payload) {\n\
         \x20   static wsaReady := false\n\
         \x20   if (!wsaReady) {\n\
         \x20       wsa := Buffer(408, 0)\n\
         \x20       if (DllCall(\"ws2_32\\WSAStartup\", \"UShort\", 0x0202, \"Ptr\", wsa) != 0)\n\
         \x20           return\n\
         \x20       wsaReady := true\n\
         \x20   }\n\
         \x20   sock := DllCall(\"ws2_32\\socket\", \"Int\", 2, \"Int\", 1, \"Int\", 6, \"Ptr\")\n\
         \x20   if (sock = -1)\n\
         \x20       return\n\
         \x20   addr := Buffer(16, 0)\n\
         \x20   NumPut(\"UShort\", 2, addr, 0)\n",
    );
    out.push_str(&format!(
        "    NumPut(\"UShort\", DllCall(\"ws2_32\\htons\", \"UShort\", {port}, \"UShort\"), addr, 2)\n"
    ));
    out.push_str(
        "    NumPut(\"UInt\", DllCall(\"ws2_32\\inet_addr\", \"AStr\", \"127.0.0.1\", \"UInt\"), addr, 4)\n\
         \x20   if (DllCall(\"ws2_32\\connect\", \"Ptr\", sock, \"Ptr\", addr, \"Int\", 16) = 0) {\n\
         \x20       buf := Buffer(StrPut(payload, \"UTF-8\"))\n\
         \x20       StrPut(payload, buf, \"UTF-8\")\n\
         \x20       DllCall(\"ws2_32\\send\", \"Ptr\", sock, \"Ptr\", buf, \"Int\", buf.Size - 1, \"Int\", 0)\n\
         \x20   }\n\
         \x20   DllCall(\"ws2_32\\closesocket\", \"Ptr\", sock)\n}\n\n",
    );

    out.push_str(&format!(
        "CleanupOnExit(reason, code) {{\n    try ProcessClose(\"{helper_base}\")\n}}\nOnExit(CleanupOnExit)\n"
    ));
}

/// File name of the helper executable, tolerating both path
/// separator conventions.
fn helper_base_name(path: &str) -> String {
    path.rsplit(['\\', '/'])
        .next()
        .unwrap_or(path)
        .to_string()
}

struct BindingEntry<'a> {
    program: &'a str,
    profile: &'a str,
    layer: Layer,
    key_name: &'a str,
    binding: &'a crate::config::Binding,
}

fn for_each_binding<'a, F: FnMut(BindingEntry<'a>)>(config: &'a Config, mut visit: F) {
    for (program_key, program) in &config.programs {
        for (profile_name, profile) in &program.profiles {
            for layer in Layer::iter() {
                for (key_name, binding) in profile.layer(layer) {
                    visit(BindingEntry {
                        program: program_key,
                        profile: profile_name,
                        layer,
                        key_name,
                        binding,
                    });
                }
            }
        }
    }
}
