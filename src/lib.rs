// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod tv_pong;
